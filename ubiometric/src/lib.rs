pub mod authenticator;
pub mod dispatch;
pub mod error;
pub mod kind;
pub mod outcome;
pub mod platform;
