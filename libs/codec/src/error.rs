//! Protocol-level errors for TLV message processing
//!
//! One taxonomy covers the whole receive path: structural problems with
//! the input, advisory type-range failures, correlation mismatches,
//! remote errors reported by the peer, and failures raised by caller
//! handlers. Structural checks that serve as iteration guards never
//! construct these errors; they simply stop the walk. Errors are only
//! built where a caller explicitly asked for validation or where the
//! dispatch loop must abort.

use thiserror::Error;

/// Errors reported by the codec and dispatch layers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer or declared length too short for the structure being read
    #[error("truncated input: need {need} bytes, got {got} ({context})")]
    Truncated {
        need: usize,
        got: usize,
        context: String,
    },

    /// Structurally inconsistent input for the declared kind
    #[error("malformed {context}: {reason}")]
    Malformed { context: String, reason: String },

    /// Attribute type above the caller's declared maximum.
    ///
    /// Advisory: unknown types from a newer protocol revision must stay
    /// skippable, so callers are expected to skip rather than abort.
    #[error("unsupported attribute type {attr_type}: maximum known type is {max_type}")]
    UnsupportedType { attr_type: u16, max_type: u16 },

    /// Message origin did not match the expected endpoint
    #[error("origin mismatch: expected {expected}, got {got}")]
    OriginMismatch { expected: u32, got: u32 },

    /// Message sequence number did not match the tracked request
    #[error("sequence mismatch: expected {expected}, got {got}")]
    SequenceMismatch { expected: u32, got: u32 },

    /// Error-control message carrying a non-zero status from the peer.
    ///
    /// The status is sign-normalized to a positive value.
    #[error("remote error: status {status}")]
    Remote { status: i32 },

    /// A caller-supplied handler reported failure
    #[error("handler error: {0}")]
    Handler(String),
}

impl ProtocolError {
    /// Create a [`ProtocolError::Truncated`] with its context string
    pub fn truncated(need: usize, got: usize, context: impl Into<String>) -> Self {
        Self::Truncated {
            need,
            got,
            context: context.into(),
        }
    }

    /// Create a [`ProtocolError::Malformed`] with its context string
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create a [`ProtocolError::Handler`] from caller detail
    pub fn handler(detail: impl Into<String>) -> Self {
        Self::Handler(detail.into())
    }
}

/// Result type for protocol operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Continue-or-stop outcome of a handler or of a full dispatch pass
///
/// Together with [`ProtocolError`] this replaces the classic
/// ok/stop/error integer protocol of C callback APIs: `Ok(Continue)`
/// keeps scanning, `Ok(Stop)` terminates successfully, `Err(_)` aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep scanning the remaining records
    Continue,
    /// Stop the runqueue; the overall outcome is success
    Stop,
}

/// Return type of message and attribute callbacks
pub type CbResult = ProtocolResult<Verdict>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let err = ProtocolError::truncated(16, 7, "message header");
        assert_eq!(
            err.to_string(),
            "truncated input: need 16 bytes, got 7 (message header)"
        );

        let err = ProtocolError::malformed("string attribute", "missing NUL terminator");
        assert_eq!(
            err.to_string(),
            "malformed string attribute: missing NUL terminator"
        );
    }

    #[test]
    fn error_categories_are_distinguishable() {
        let truncated = ProtocolError::truncated(4, 0, "x");
        let malformed = ProtocolError::malformed("x", "y");
        assert_ne!(truncated, malformed);
        assert!(matches!(truncated, ProtocolError::Truncated { .. }));
        assert!(matches!(malformed, ProtocolError::Malformed { .. }));
    }
}
