use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Raw modality code as reported by the platform service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformBiometryType(pub i64);

impl PlatformBiometryType {
    pub const NONE: Self = Self(0);
    pub const TOUCH_ID: Self = Self(1);
    pub const FACE_ID: Self = Self(2);
    pub const OPTIC_ID: Self = Self(4);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricKind {
    None,
    Fingerprint,
    Face,
}

impl From<PlatformBiometryType> for BiometricKind {
    fn from(value: PlatformBiometryType) -> Self {
        match value {
            PlatformBiometryType::TOUCH_ID => Self::Fingerprint,
            PlatformBiometryType::FACE_ID => Self::Face,
            // anything we don't know how to prompt for is treated as absent
            _ => Self::None,
        }
    }
}

impl Display for BiometricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Fingerprint => write!(f, "Fingerprint"),
            Self::Face => write!(f, "Face"),
        }
    }
}
