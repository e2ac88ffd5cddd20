use std::time::Duration;

use catlink_frame::FrameError;
use catlink_serial::SerialError;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint could not be opened or written.
    #[error("connection error: {0}")]
    Connection(#[from] SerialError),

    /// The link was lost mid-read. The endpoint has been closed; the next
    /// `recv` reopens it.
    #[error("serial link lost: {0}")]
    Fatal(FrameError),

    /// The stream violated a framing bound. The endpoint stays open.
    #[error("frame error: {0}")]
    Frame(FrameError),

    /// No delimiter arrived within the configured read timeout. Buffered
    /// bytes are kept for the next `recv`.
    #[error("read timed out after {0:?}")]
    Timeout(Duration),
}

impl TransportError {
    /// Whether the endpoint was closed because of this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Fatal(_))
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
