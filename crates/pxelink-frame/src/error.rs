/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// No delimiter within the largest stuffed size the receiver accepts.
    #[error("frame exceeds {max} stuffed bytes without a delimiter")]
    FrameTooLarge { max: usize },

    /// A delimiter byte appeared inside a stuffed frame.
    #[error("unexpected delimiter at offset {offset} in stuffed frame")]
    Delimiter { offset: usize },

    /// A group length byte points past the end of the frame.
    #[error("group code 0x{code:02x} at offset {offset} runs past end of frame")]
    Truncated { offset: usize, code: u8 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel was closed before a complete frame was transferred.
    #[error("channel closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
