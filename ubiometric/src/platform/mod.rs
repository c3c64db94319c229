use std::sync::Arc;

use log::info;

use crate::{
    kind::PlatformBiometryType,
    outcome::{PlatformErrorCode, PlatformReply},
};

mod helper;
mod no_op;

pub use helper::HelperService;
pub use no_op::NoOpService;

pub const DEFAULT_HELPER: &str = "totem";

/// Result of a capability probe, detail included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityProbe {
    pub available: bool,
    pub detail: Option<PlatformErrorCode>,
}

impl CapabilityProbe {
    #[must_use]
    pub fn available() -> Self {
        Self { available: true, detail: None }
    }

    #[must_use]
    pub fn unavailable(detail: Option<PlatformErrorCode>) -> Self {
        Self { available: false, detail }
    }
}

/// Completion handler handed to the platform with every request.
///
/// Platforms are not trusted to call it exactly once, so it can be cloned
/// and invoked any number of times.
#[derive(Clone)]
pub struct ReplyHandler {
    inner: Arc<dyn Fn(PlatformReply) + Send + Sync>,
}

impl ReplyHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(PlatformReply) + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub fn reply(&self, reply: PlatformReply) {
        (self.inner)(reply);
    }
}

pub trait PlatformBiometricService: Send + Sync {
    fn probe_capability(&self) -> CapabilityProbe;

    /// Only meaningful after a capability probe.
    fn read_biometric_kind(&self) -> PlatformBiometryType;

    fn request_authentication(&self, reason: &str, reply: ReplyHandler);
}

/// Picks the helper backed service when the helper can be found.
#[must_use]
pub fn default_service(helper: Option<&str>) -> Arc<dyn PlatformBiometricService> {
    let name = helper.unwrap_or(DEFAULT_HELPER);

    match HelperService::find(name) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            info!("no biometric helper available ({e})");
            Arc::new(NoOpService)
        }
    }
}
