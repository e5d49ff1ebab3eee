//! Error types for the publishing pipeline.
//!
//! Errors are split by severity:
//! - **Fatal-at-init** ([`Error::Init`]): initialization aborts, partial
//!   state is released and `initialize` may be retried.
//! - **Recoverable-at-runtime** ([`SinkError`], [`AudioError`]): a single
//!   failed write, conversion or encode tick is logged by the publishing
//!   loop and the affected packet is dropped; the stream keeps going.
//! - **Programmer errors** ([`Error::TimeBaseMismatch`],
//!   [`Error::InvalidTransition`], [`Error::PushedAfterTeardown`]): logic
//!   bugs, reported loudly instead of being swallowed.

use crate::packet::{Packet, TimeBase};
use crate::state::PipelineState;

/// Top-level error for publisher lifecycle and producer operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Initialization failed; all partially acquired resources were
    /// released and the pipeline is still `Uninitialized`.
    #[error("publisher initialization failed: {0}")]
    Init(#[from] SinkError),

    /// A lifecycle call that the state machine forbids.
    #[error("invalid pipeline transition: {from} -> {to}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },

    /// The handoff queue was at capacity; the packet is handed back so the
    /// producer can decide whether to drop or retry.
    #[error("publisher queue is full")]
    QueueFull { packet: Packet },

    /// A packet was pushed after `stop()`; the queue is closed and will
    /// never drain again.
    #[error("packet pushed after stop")]
    PushedAfterStop,

    /// A packet was pushed after the pipeline was torn down.
    #[error("packet pushed after teardown")]
    PushedAfterTeardown,

    /// A packet reached the normalizer in an unexpected time base, which
    /// almost always means it was already rescaled once.
    #[error("packet time base mismatch: expected {expected}, found {found} (already rescaled?)")]
    TimeBaseMismatch {
        expected: TimeBase,
        found: TimeBase,
    },
}

/// Errors surfaced by a [`MediaSink`](crate::sink::MediaSink) implementation.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Opening the output target failed.
    #[error("failed to open sink: {reason}")]
    OpenFailed { reason: String },

    /// Registering an output stream failed.
    #[error("failed to create output stream: {reason}")]
    StreamCreation { reason: String },

    /// A header, packet or trailer write failed.
    #[error("write failed: {reason}")]
    WriteFailed { reason: String },

    /// Custom error for user-implemented sinks.
    #[error("{0}")]
    Custom(String),
}

impl SinkError {
    pub fn open_failed(reason: impl Into<String>) -> Self {
        Self::OpenFailed {
            reason: reason.into(),
        }
    }

    pub fn write_failed(reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            reason: reason.into(),
        }
    }

    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Errors surfaced by the audio conversion/encode collaborators.
///
/// All of these are non-fatal to the publishing loop: the tick produces no
/// audio packet and the stream continues.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// Sample format conversion failed.
    #[error("sample conversion failed: {reason}")]
    ConversionFailed { reason: String },

    /// The encoder rejected a frame.
    #[error("encode failed: {reason}")]
    EncodeFailed { reason: String },

    /// Custom error for user-implemented encoders.
    #[error("{0}")]
    Custom(String),
}

impl AudioError {
    pub fn conversion_failed(reason: impl Into<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
        }
    }

    pub fn encode_failed(reason: impl Into<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_display() {
        let err = SinkError::write_failed("connection reset");
        assert_eq!(err.to_string(), "write failed: connection reset");
    }

    #[test]
    fn test_double_rescale_error_display() {
        let err = Error::TimeBaseMismatch {
            expected: TimeBase::new(1, 25),
            found: TimeBase::new(1, 90_000),
        };
        assert!(err.to_string().contains("1/25"));
        assert!(err.to_string().contains("already rescaled"));
    }
}
