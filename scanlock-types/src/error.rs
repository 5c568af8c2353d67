//! Error types for scanlock.

use thiserror::Error;

/// Errors that can occur in scanlock pipeline operations.
///
/// Everything here degrades gracefully where possible: a failed line read
/// or write corrupts or skips output, it never halts the cipher state
/// machine. [`LinkError::Closed`] means a collaborator is gone for good
/// and ends the pipeline run (a host/test affordance; on the embedded
/// target the collaborators never close).
#[derive(Debug, Error)]
pub enum LinkError {
    /// Line source collaborator failed.
    #[error("line source error: {0}")]
    Source(String),

    /// Line sink collaborator failed.
    #[error("line sink error: {0}")]
    Sink(String),

    /// A collaborator has shut down and will produce no further events.
    #[error("collaborator closed")]
    Closed,

    /// A buffer of the wrong width was handed to the pipeline.
    #[error("line width mismatch: expected {expected}, got {actual}")]
    WidthMismatch {
        /// Configured active-line width in bytes.
        expected: usize,
        /// Width of the offending buffer.
        actual: usize,
    },

    /// Invalid link configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal error (a stage task failed outside its own error path).
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LinkError::WidthMismatch {
            expected: 720,
            actual: 640,
        };
        assert_eq!(err.to_string(), "line width mismatch: expected 720, got 640");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LinkError>();
    }
}
