use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlmoxError {
    #[error("not initialized: run 'almox init'")]
    NotInitialized,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid code '{0}': expected an optional non-digit prefix followed by digits")]
    InvalidCode(String),

    #[error("code already in use: {0}")]
    UniquenessViolation(String),

    #[error("sequence exhausted after {0}")]
    SequenceExhausted(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AlmoxError {
    /// True for failures a caller may retry later without changing its input.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AlmoxError::StoreUnavailable(_) | AlmoxError::UniquenessViolation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AlmoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_transient() {
        assert!(AlmoxError::StoreUnavailable("timed out".into()).is_transient());
        assert!(AlmoxError::UniquenessViolation("ALM-0007".into()).is_transient());
        assert!(!AlmoxError::InvalidArgument("count must be positive".into()).is_transient());
        assert!(!AlmoxError::InvalidCode("???".into()).is_transient());
    }
}
