use std::path::PathBuf;

/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the channel.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to apply line settings to a terminal device.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate has no termios equivalent.
    #[error("unsupported baud rate {0}")]
    UnsupportedBaudRate(u32),

    /// An I/O error occurred on the channel.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
