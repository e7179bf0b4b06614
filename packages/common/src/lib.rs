pub mod contest_status;
pub mod user_role;

pub use contest_status::ContestStatus;
pub use user_role::UserRole;

use thiserror::Error;

/// Error when parsing an invalid enum string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} '{invalid}'. Valid values: {valid}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub invalid: String,
    pub valid: String,
}
