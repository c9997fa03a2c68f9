use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, SessionError};

/// BEGIN: announces name, size, and digest of the image.
pub const MSG_BEGIN: u8 = 1;
/// DATA: one chunk of the image.
pub const MSG_DATA: u8 = 2;
/// END: closes the transfer.
pub const MSG_END: u8 = 3;

/// Largest chunk carried by one DATA message.
pub const MAX_CHUNK_SIZE: usize = 240;

/// Longest destination name accepted in BEGIN.
pub const MAX_NAME_LEN: usize = 120;

/// type(1) + seq(4) + name_len(2) + total_size(4) + digest(4).
pub const BEGIN_HEADER_LEN: usize = 15;
/// type(1) + seq(4) + chunk_len(2).
pub const DATA_HEADER_LEN: usize = 7;
/// type(1) + seq(4).
pub const END_LEN: usize = 5;

/// One transfer message, before stuffing.
///
/// Wire layout (little-endian):
/// ```text
/// BEGIN │ 01 │ seq=0 (4) │ name_len (2) │ total_size (4) │ digest (4) │ name │
/// DATA  │ 02 │ seq (4)   │ chunk_len (2) │ chunk │
/// END   │ 03 │ seq (4)   │
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Begin {
        name: String,
        total_size: u32,
        digest: u32,
    },
    Data {
        seq: u32,
        chunk: Bytes,
    },
    End {
        seq: u32,
    },
}

impl Message {
    /// The type tag that leads the encoded message.
    pub fn type_tag(&self) -> u8 {
        match self {
            Message::Begin { .. } => MSG_BEGIN,
            Message::Data { .. } => MSG_DATA,
            Message::End { .. } => MSG_END,
        }
    }

    /// Sequence number. BEGIN is always zero.
    pub fn seq(&self) -> u32 {
        match self {
            Message::Begin { .. } => 0,
            Message::Data { seq, .. } | Message::End { seq } => *seq,
        }
    }

    /// Encoded length in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Message::Begin { name, .. } => BEGIN_HEADER_LEN + name.len(),
            Message::Data { chunk, .. } => DATA_HEADER_LEN + chunk.len(),
            Message::End { .. } => END_LEN,
        }
    }

    /// Append the encoded message to `dst`.
    ///
    /// Name and chunk lengths travel as u16. A longer field is rejected with
    /// [`SessionError::MessageTooLarge`] and nothing is appended.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        let field_len = match self {
            Message::Begin { name, .. } => Some(("begin", name.len())),
            Message::Data { chunk, .. } => Some(("data", chunk.len())),
            Message::End { .. } => None,
        };
        let field_len = match field_len {
            Some((kind, len)) => Some(u16::try_from(len).map_err(|_| {
                SessionError::MessageTooLarge {
                    kind,
                    len: self.encoded_len(),
                    max: usize::from(u16::MAX),
                }
            })?),
            None => None,
        };

        dst.reserve(self.encoded_len());
        dst.put_u8(self.type_tag());
        dst.put_u32_le(self.seq());
        if let Some(len) = field_len {
            dst.put_u16_le(len);
        }
        match self {
            Message::Begin {
                name,
                total_size,
                digest,
            } => {
                dst.put_u32_le(*total_size);
                dst.put_u32_le(*digest);
                dst.put_slice(name.as_bytes());
            }
            Message::Data { chunk, .. } => dst.put_slice(chunk),
            Message::End { .. } => {}
        }
        Ok(())
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Parse an unstuffed message, as the device receiver would.
    ///
    /// The declared name and chunk lengths must account for every byte.
    pub fn decode(src: &[u8]) -> Result<Self> {
        if src.len() < END_LEN {
            return Err(SessionError::Malformed {
                kind: "short",
                len: src.len(),
            });
        }

        let mut buf = src;
        let tag = buf.get_u8();
        let seq = buf.get_u32_le();

        match tag {
            MSG_BEGIN => {
                if src.len() < BEGIN_HEADER_LEN {
                    return Err(malformed("begin", src));
                }
                if seq != 0 {
                    return Err(SessionError::BadBeginSequence(seq));
                }
                let name_len = usize::from(buf.get_u16_le());
                let total_size = buf.get_u32_le();
                let digest = buf.get_u32_le();
                if buf.len() != name_len {
                    return Err(malformed("begin", src));
                }
                if !buf.is_ascii() {
                    return Err(SessionError::NameNotAscii);
                }
                let name = String::from_utf8_lossy(buf).into_owned();
                Ok(Message::Begin {
                    name,
                    total_size,
                    digest,
                })
            }
            MSG_DATA => {
                if src.len() < DATA_HEADER_LEN {
                    return Err(malformed("data", src));
                }
                let chunk_len = usize::from(buf.get_u16_le());
                if buf.len() != chunk_len {
                    return Err(malformed("data", src));
                }
                Ok(Message::Data {
                    seq,
                    chunk: Bytes::copy_from_slice(buf),
                })
            }
            MSG_END => {
                if !buf.is_empty() {
                    return Err(malformed("end", src));
                }
                Ok(Message::End { seq })
            }
            other => Err(SessionError::UnknownType(other)),
        }
    }
}

fn malformed(kind: &'static str, src: &[u8]) -> SessionError {
    SessionError::Malformed {
        kind,
        len: src.len(),
    }
}
