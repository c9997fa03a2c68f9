use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{encode_frame, max_encoded_len, FrameConfig};
use crate::error::{FrameError, Result};

/// Writes complete, delimited frames to any `Write` stream.
///
/// Every frame is flushed before `send` returns, so at most one frame is
/// ever buffered between the writer and the device.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    frames_written: u64,
    bytes_written: u64,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(max_encoded_len(config.max_payload_size) + 1),
            config,
            frames_written: 0,
            bytes_written: 0,
        }
    }

    /// Stuff, delimit, write, and flush one payload (blocking).
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_frame(payload, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()?;

        self.frames_written += 1;
        self.bytes_written += self.buf.len() as u64;
        trace!(
            payload_len = payload.len(),
            wire_len = self.buf.len(),
            "frame written"
        );
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Number of frames written and flushed so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Number of wire bytes (stuffed payloads plus delimiters) written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
