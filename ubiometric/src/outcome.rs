use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Raw failure code as reported by the platform service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformErrorCode(pub i64);

impl PlatformErrorCode {
    pub const AUTHENTICATION_FAILED: Self = Self(-1);
    pub const USER_CANCEL: Self = Self(-2);
    pub const USER_FALLBACK: Self = Self(-3);
    pub const SYSTEM_CANCEL: Self = Self(-4);
    pub const PASSCODE_NOT_SET: Self = Self(-5);
    pub const BIOMETRY_NOT_AVAILABLE: Self = Self(-6);
    pub const BIOMETRY_NOT_ENROLLED: Self = Self(-7);
    pub const BIOMETRY_LOCKOUT: Self = Self(-8);
    pub const APP_CANCEL: Self = Self(-9);
    pub const INVALID_CONTEXT: Self = Self(-10);
}

impl Display for PlatformErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of a single platform completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformReply {
    pub success: bool,
    pub error: Option<PlatformErrorCode>,
}

impl PlatformReply {
    #[must_use]
    pub fn success() -> Self {
        Self { success: true, error: None }
    }

    #[must_use]
    pub fn failure(error: Option<PlatformErrorCode>) -> Self {
        Self { success: false, error }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    AuthenticationFailed,
    UserCancelled,
    UserRequestedFallback,
    BiometryUnavailable,
    BiometryNotEnrolled,
    BiometryLockedOut,
    NotConfigured,
}

impl From<PlatformErrorCode> for DenialReason {
    fn from(code: PlatformErrorCode) -> Self {
        match code {
            PlatformErrorCode::AUTHENTICATION_FAILED => Self::AuthenticationFailed,
            PlatformErrorCode::USER_CANCEL => Self::UserCancelled,
            PlatformErrorCode::USER_FALLBACK => Self::UserRequestedFallback,
            PlatformErrorCode::BIOMETRY_NOT_AVAILABLE => Self::BiometryUnavailable,
            PlatformErrorCode::BIOMETRY_NOT_ENROLLED => Self::BiometryNotEnrolled,
            PlatformErrorCode::BIOMETRY_LOCKOUT => Self::BiometryLockedOut,
            _ => Self::NotConfigured,
        }
    }
}

impl Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::AuthenticationFailed => "there was a problem verifying your identity",
            Self::UserCancelled => "you pressed cancel",
            Self::UserRequestedFallback => "you pressed password",
            Self::BiometryUnavailable => "biometric authentication is not available",
            Self::BiometryNotEnrolled => "biometric authentication is not set up",
            Self::BiometryLockedOut => "biometric authentication is locked",
            Self::NotConfigured => "biometric authentication may not be configured",
        };

        write!(f, "{message}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum AuthenticationOutcome {
    Authorized,
    Denied(DenialReason),
}

impl AuthenticationOutcome {
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    #[must_use]
    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            Self::Authorized => None,
            Self::Denied(reason) => Some(*reason),
        }
    }
}

impl From<PlatformReply> for AuthenticationOutcome {
    fn from(reply: PlatformReply) -> Self {
        if reply.success {
            return Self::Authorized;
        }

        //
        // a failure that carries no code still has to resolve to a reason
        //
        let reason = reply.error.map_or(DenialReason::NotConfigured, DenialReason::from);

        Self::Denied(reason)
    }
}

impl Display for AuthenticationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authorized => write!(f, "authorized"),
            Self::Denied(reason) => write!(f, "denied: {reason}"),
        }
    }
}
