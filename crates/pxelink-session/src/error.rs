/// Errors that can occur in a transfer session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The destination name does not fit in a BEGIN message.
    #[error("destination name too long ({len} bytes, max {max})")]
    NameTooLong { len: usize, max: usize },

    /// The destination name contains non-ASCII characters.
    #[error("destination name must be ASCII")]
    NameNotAscii,

    /// The image size does not fit the 32-bit size field.
    #[error("image too large for transfer ({0} bytes)")]
    ImageTooLarge(usize),

    /// The configured chunk size is outside what the receiver accepts.
    #[error("invalid chunk size {size} (must be 1..={max})")]
    InvalidChunkSize { size: usize, max: usize },

    /// A message would exceed the frame writer's payload limit.
    #[error("{kind} message too large for channel ({len} bytes, max {max})")]
    MessageTooLarge {
        kind: &'static str,
        len: usize,
        max: usize,
    },

    /// The session has already been used for a transfer.
    #[error("session already completed")]
    AlreadyCompleted,

    /// Writing or flushing a frame failed; the transfer is incomplete.
    #[error("channel error: {0}")]
    Channel(#[from] pxelink_frame::FrameError),

    /// A message is shorter or longer than its declared layout.
    #[error("malformed {kind} message ({len} bytes)")]
    Malformed { kind: &'static str, len: usize },

    /// A message carries an unknown type tag.
    #[error("unknown message type {0}")]
    UnknownType(u8),

    /// A BEGIN message with a sequence number other than zero.
    #[error("begin message with sequence {0} (expected 0)")]
    BadBeginSequence(u32),
}

pub type Result<T> = std::result::Result<T, SessionError>;
