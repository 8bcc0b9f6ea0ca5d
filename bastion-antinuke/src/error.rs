use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    /// A numeric setting was outside `1..=max`.
    #[error("{field} must be between 1 and {max} (got {value})")]
    InvalidConfig {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("unknown punishment `{0}`; expected kick, ban or demote")]
    UnknownPunishment(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl GuardError {
    /// Whether the error was caused by admin input rather than the backend.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            GuardError::InvalidConfig { .. } | GuardError::UnknownPunishment(_)
        )
    }
}
