use crate::{
    kind::PlatformBiometryType,
    outcome::{PlatformErrorCode, PlatformReply},
    platform::{CapabilityProbe, PlatformBiometricService, ReplyHandler},
};

/// Service for hosts without any biometric support.
pub struct NoOpService;

impl PlatformBiometricService for NoOpService {
    fn probe_capability(&self) -> CapabilityProbe {
        CapabilityProbe::unavailable(Some(PlatformErrorCode::BIOMETRY_NOT_AVAILABLE))
    }

    fn read_biometric_kind(&self) -> PlatformBiometryType {
        PlatformBiometryType::NONE
    }

    fn request_authentication(&self, _reason: &str, reply: ReplyHandler) {
        reply.reply(PlatformReply::failure(Some(PlatformErrorCode::BIOMETRY_NOT_AVAILABLE)));
    }
}
