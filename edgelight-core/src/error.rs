//! Error types for the edgelight pipeline.
//!
//! Every fallible pipeline stage returns `Result<T, EdgeError>`. Whether an
//! error is fatal is decided by the scheduler, not by the stage that raised it.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the capture → transmit pipeline.
#[derive(Debug, Error)]
pub enum EdgeError {
    // ── Capture Errors ───────────────────────────────────────────
    /// No display surface could be opened at all.
    #[error("no display available for capture")]
    NoDisplay,

    /// The capture backend failed while acquiring or copying a frame.
    #[error("capture error: {0}")]
    Capture(String),

    /// The desktop did not present a new frame within the deadline.
    #[error("capture timed out after {0:?}")]
    Timeout(Duration),

    /// A pixel buffer's dimensions do not fit its backing storage.
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(&'static str),

    // ── Transport Errors ─────────────────────────────────────────
    /// The controller's host name did not resolve to any address.
    #[error("cannot resolve {0}")]
    Resolve(String),

    /// A datagram could not be handed to the network stack.
    #[error("send failed: {0}")]
    Send(std::io::Error),

    /// Socket setup or other I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

impl EdgeError {
    /// Whether the scheduler may carry on with the next tick after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, EdgeError::Timeout(_) | EdgeError::Send(_))
    }
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for EdgeError {
    fn from(s: String) -> Self {
        EdgeError::Other(s)
    }
}

impl From<&str> for EdgeError {
    fn from(s: &str) -> Self {
        EdgeError::Other(s.to_string())
    }
}
