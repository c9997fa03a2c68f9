use std::fmt;
use std::io;

use pxelink_frame::FrameError;
use pxelink_image::ImageError;
use pxelink_session::SessionError;
use pxelink_transport::TransportError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        TransportError::UnsupportedBaudRate(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn image_error(context: &str, err: ImageError) -> CliError {
    match err {
        ImageError::Io(source) => io_error(context, source),
        ImageError::SymbolNotFound(_) | ImageError::Toolchain(_) => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Channel(err) => frame_error(context, err),
        SessionError::NameTooLong { .. }
        | SessionError::NameNotAscii
        | SessionError::InvalidChunkSize { .. }
        | SessionError::MessageTooLarge { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        SessionError::ImageTooLarge(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
