use thiserror::Error;

/// Stream-level error taxonomy.
///
/// Everything here is scoped to one audio stream: the worst outcome of any
/// variant is that stream's connection closing. Nothing in this taxonomy
/// may crash the process.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Malformed wire frame or connection read failure. Terminates the
    /// stream with a descriptive close code; no retry.
    #[error("transport error: {0}")]
    Transport(String),

    /// Corrupted media payload. Unrecoverable for this connection.
    #[error("media decode error: {0}")]
    Decode(String),

    /// The underlying frame detector failed. Terminates the stream.
    #[error("classification error: {0}")]
    Classification(String),

    /// Conversion or downstream-call failure for one utterance. The
    /// buffer is released, the utterance is not retried, and the stream
    /// continues unaffected.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StreamError {
    /// Whether this error terminates the stream's session. Dispatch
    /// failures are isolated to their own task and recoverable.
    pub fn is_fatal_to_stream(&self) -> bool {
        !matches!(self, StreamError::Dispatch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_failures_are_recoverable() {
        assert!(!StreamError::Dispatch("workflow down".into()).is_fatal_to_stream());
        assert!(StreamError::Transport("read failed".into()).is_fatal_to_stream());
        assert!(StreamError::Decode("bad base64".into()).is_fatal_to_stream());
        assert!(StreamError::Classification("bad frame".into()).is_fatal_to_stream());
    }

    #[test]
    fn test_display_is_descriptive() {
        let err = StreamError::Transport("could not receive message".into());
        assert_eq!(err.to_string(), "transport error: could not receive message");
    }
}
