use std::io::Write;

use bytes::{Bytes, BytesMut};
use pxelink_frame::FrameWriter;
use tracing::{debug, info};

use crate::digest::Digest;
use crate::error::{Result, SessionError};
use crate::message::{
    Message, BEGIN_HEADER_LEN, DATA_HEADER_LEN, MAX_CHUNK_SIZE, MAX_NAME_LEN,
};

/// Transfer session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bytes of image per DATA message, `1..=MAX_CHUNK_SIZE`.
    pub chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_CHUNK_SIZE,
        }
    }
}

/// Summary of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    /// Image bytes announced in BEGIN and carried by DATA.
    pub total_size: u32,
    /// Digest announced in BEGIN.
    pub digest: u32,
    /// Number of DATA messages.
    pub data_frames: u32,
    /// Sequence number carried by END.
    pub end_seq: u32,
    /// Frames written, BEGIN and END included.
    pub frames_sent: u64,
    /// Stuffed bytes written, delimiters included.
    pub wire_bytes: u64,
}

/// Pushes one image to the device as BEGIN, DATA..., END.
///
/// A session is single-use. It is marked completed as soon as a transfer
/// starts, so a session that failed half way cannot be resumed with
/// sequence numbers the receiver never saw in order.
pub struct TransferSession<W> {
    writer: FrameWriter<W>,
    config: SessionConfig,
    next_seq: u32,
    completed: bool,
    scratch: BytesMut,
}

impl<W: Write> TransferSession<W> {
    /// Create a session over an existing frame writer.
    pub fn new(writer: FrameWriter<W>) -> Self {
        Self::with_config(writer, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(writer: FrameWriter<W>, config: SessionConfig) -> Self {
        Self {
            writer,
            config,
            next_seq: 0,
            completed: false,
            scratch: BytesMut::new(),
        }
    }

    /// Send `image` to be stored under `name` on the device.
    ///
    /// Validation happens before the first byte is written. An I/O failure
    /// afterwards leaves the receiver mid-transfer; nothing is sent to
    /// clean up.
    pub fn transfer(&mut self, name: &str, image: &[u8]) -> Result<TransferReport> {
        if self.completed {
            return Err(SessionError::AlreadyCompleted);
        }
        let chunk_size = self.config.chunk_size;
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(SessionError::InvalidChunkSize {
                size: chunk_size,
                max: MAX_CHUNK_SIZE,
            });
        }
        validate_name(name)?;
        let total_size =
            u32::try_from(image.len()).map_err(|_| SessionError::ImageTooLarge(image.len()))?;
        self.check_fits("begin", BEGIN_HEADER_LEN + name.len())?;
        if !image.is_empty() {
            self.check_fits("data", DATA_HEADER_LEN + chunk_size.min(image.len()))?;
        }

        let mut digest = Digest::new();
        digest.update(image);
        let digest = digest.value();

        let frames_before = self.writer.frames_written();
        let bytes_before = self.writer.bytes_written();
        self.completed = true;

        self.send(&Message::Begin {
            name: name.to_string(),
            total_size,
            digest,
        })?;
        info!(
            name,
            total_size,
            digest = format_args!("{digest:#010x}"),
            "transfer started"
        );
        self.next_seq = 1;

        let mut data_frames = 0u32;
        for chunk in image.chunks(chunk_size) {
            let seq = self.next_seq;
            self.send(&Message::Data {
                seq,
                chunk: Bytes::copy_from_slice(chunk),
            })?;
            debug!(seq, len = chunk.len(), "data sent");
            self.next_seq += 1;
            data_frames += 1;
        }

        let end_seq = self.next_seq;
        self.send(&Message::End { seq: end_seq })?;
        self.next_seq += 1;

        let report = TransferReport {
            total_size,
            digest,
            data_frames,
            end_seq,
            frames_sent: self.writer.frames_written() - frames_before,
            wire_bytes: self.writer.bytes_written() - bytes_before,
        };
        info!(
            end_seq,
            frames = report.frames_sent,
            wire_bytes = report.wire_bytes,
            "transfer finished"
        );
        Ok(report)
    }

    /// Sequence number the next message would carry.
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }

    /// True once a transfer has been attempted.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Get a reference to the underlying frame writer.
    pub fn get_ref(&self) -> &FrameWriter<W> {
        &self.writer
    }

    /// Consume the session and return the frame writer.
    pub fn into_inner(self) -> FrameWriter<W> {
        self.writer
    }

    fn check_fits(&self, kind: &'static str, len: usize) -> Result<()> {
        let max = self.writer.config().max_payload_size;
        if len > max {
            return Err(SessionError::MessageTooLarge { kind, len, max });
        }
        Ok(())
    }

    fn send(&mut self, message: &Message) -> Result<()> {
        self.scratch.clear();
        message.encode(&mut self.scratch)?;
        self.writer.send(&self.scratch)?;
        Ok(())
    }
}

/// Check that `name` fits a BEGIN message and the receiver's name buffer.
pub fn validate_name(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(SessionError::NameTooLong {
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    if !name.is_ascii() {
        return Err(SessionError::NameNotAscii);
    }
    Ok(())
}
