//! Error types for the SMP engine.
//!
//! Every fallible operation in the crate returns an [`SmpError`]. None of
//! them are retried internally: a caller that wants another attempt must
//! start a fresh [`SmpStateMachine`](super::SmpStateMachine).

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SmpError>;

/// Errors that can occur while encoding, decoding, or running SMP.
#[derive(Debug, Error)]
pub enum SmpError {
    /// A byte buffer is malformed: wrong length, truncated, trailing bytes,
    /// unknown TLV tag, or a point that is not on the curve.
    #[error("format error: {0}")]
    Format(String),

    /// A value is outside the domain of the type being constructed.
    #[error("range error: {0}")]
    Range(String),

    /// The state machine received a message it does not accept in its
    /// current phase. The phase is left untouched.
    #[error("unexpected message: in {phase}, received {message}")]
    UnexpectedMessage {
        /// The phase the state machine is in.
        phase: String,
        /// The message (or trigger) that was received.
        message: String,
    },

    /// A structurally valid message carried a proof that does not check
    /// out, or a group element outside the prime-order subgroup.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// The result was queried before the protocol finished.
    #[error("SMP has not finished yet")]
    NotFinished,

    /// An earlier verification failure poisoned this state machine.
    #[error("SMP run was aborted after a verification failure")]
    Aborted,

    /// The hash backend refused its input.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// The transport collaborator failed to deliver or accept a frame.
    #[error("transport error: {0}")]
    Transport(String),

    /// The peer did not answer in time.
    #[error("timed out after {timeout_ms}ms waiting for {waiting_for}")]
    Timeout {
        /// The message we were waiting for.
        waiting_for: String,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },
}

impl SmpError {
    /// Shorthand for a format error about a field that ran out of bytes.
    pub(crate) fn too_short(what: &str, expected: usize, actual: usize) -> Self {
        SmpError::Format(format!(
            "{what}: need {expected} bytes, only {actual} available"
        ))
    }
}
