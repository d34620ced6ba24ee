use thiserror::Error;

/// Errors raised by scene model operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Node '{0}' already exists")]
    DuplicateId(String),

    #[error("Edge {from} -> {to} references unknown node '{missing}'")]
    UnknownNode {
        from: String,
        to: String,
        missing: String,
    },

    /// Non-fatal: callers treat this as a no-op
    #[error("Node '{0}' not found")]
    NotFound(String),
}

impl SceneError {
    /// Whether the failed call may simply be ignored
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SceneError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SceneError::UnknownNode {
            from: "a".to_string(),
            to: "b".to_string(),
            missing: "b".to_string(),
        };
        assert_eq!(err.to_string(), "Edge a -> b references unknown node 'b'");
        assert_eq!(
            SceneError::DuplicateId("a".to_string()).to_string(),
            "Node 'a' already exists"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(SceneError::NotFound("x".to_string()).is_recoverable());
        assert!(!SceneError::DuplicateId("x".to_string()).is_recoverable());
    }
}
