//! Serial channel abstraction for image transfers.
//!
//! A channel is a named device such as `/dev/ttyACM0` opened for exclusive
//! writing. On Unix, terminal devices are switched to raw 8N1 at the
//! configured baud rate and flushing drains the output queue. Any other path
//! is written as a plain file, which makes it possible to capture a transfer
//! byte-for-byte.
//!
//! This is the lowest layer of pxelink. Everything else builds on top of
//! the [`SerialChannel`] type provided here.

pub mod channel;
pub mod config;
pub mod error;

#[cfg(unix)]
mod termios;

pub use channel::{ChannelKind, SerialChannel};
pub use config::{SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_SETTLE_DELAY};
pub use error::{Result, TransportError};
