/// Errors that can occur while extracting frames from a byte stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading from the source.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source reached end of stream before the delimiter appeared.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// No delimiter appeared within the configured bound.
    #[error("frame too large ({size} bytes buffered, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// A START or END marker was empty.
    #[error("frame markers must not be empty")]
    EmptyMarker,
}

pub type Result<T> = std::result::Result<T, FrameError>;
