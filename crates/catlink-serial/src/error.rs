/// Errors that can occur while managing a serial endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// The device is missing, busy, or permission was denied.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// Discarding the driver's input/output buffers failed.
    #[error("failed to reset serial buffers: {0}")]
    Reset(std::io::Error),

    /// An I/O error occurred on the open endpoint.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SerialError {
    /// Kind of the underlying I/O error.
    pub fn io_kind(&self) -> std::io::ErrorKind {
        match self {
            SerialError::Open { source, .. } => source.kind(),
            SerialError::Reset(source) | SerialError::Io(source) => source.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SerialError>;
