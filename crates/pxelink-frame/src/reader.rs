use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};

use crate::codec::{decode_frame, max_encoded_len, FrameConfig, DELIMITER};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete, unstuffed frames from any `Read` stream.
///
/// This is the receiving half of the framing contract: bytes are buffered up
/// to the next delimiter, then unstuffed. Malformed frames are reported as
/// errors and never returned shortened. After an oversized frame the reader
/// skips ahead to the next delimiter, so one bad frame costs one error.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    skipping: bool,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(max_encoded_len(config.max_payload_size) + 1),
            config,
            skipping: false,
        }
    }

    /// Read the next complete frame payload (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if self.skipping {
                match self.buf.iter().position(|&b| b == DELIMITER) {
                    Some(end) => {
                        self.buf.advance(end + 1);
                        self.skipping = false;
                    }
                    None => self.buf.clear(),
                }
            }

            if !self.skipping {
                let terminated = self.buf.contains(&DELIMITER);
                match decode_frame(&mut self.buf, self.config.max_payload_size) {
                    Ok(Some(payload)) => return Ok(payload),
                    Ok(None) => {}
                    Err(err @ FrameError::FrameTooLarge { .. }) => {
                        // The unterminated tail is still arriving.
                        self.skipping = !terminated;
                        return Err(err);
                    }
                    Err(err) => return Err(err),
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
