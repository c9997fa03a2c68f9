use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Reserved byte that terminates every frame on the wire.
pub const DELIMITER: u8 = 0x00;

/// Largest group code. A group with this code carries 254 data bytes and
/// implies no delimiter after it.
pub const MAX_CODE: u8 = 0xFF;

/// Most data bytes a single group can carry.
pub const MAX_GROUP_LEN: usize = MAX_CODE as usize - 1;

/// Default maximum unstuffed payload size, matching the receiver's decode buffer.
pub const DEFAULT_MAX_PAYLOAD: usize = 512;

/// Upper bound on the stuffed size of a `payload_len`-byte payload,
/// excluding the trailing delimiter.
pub fn max_encoded_len(payload_len: usize) -> usize {
    payload_len + payload_len / MAX_GROUP_LEN + 2
}

/// Byte-stuff `payload` so that the result contains no [`DELIMITER`].
///
/// Encoding (consistent overhead byte stuffing):
/// ```text
/// payload:  11 22 00 33 00
/// encoded:  03 11 22 02 33 01
///           ^^       ^^    ^^ trailing marker for the final 00
/// ```
/// Each group starts with a code byte `n` followed by `n - 1` data bytes. A
/// group shorter than 254 bytes stands for "data, then one delimiter"; a full
/// group (code 0xFF) stands for data alone. A payload ending in a delimiter
/// gets an explicit one-byte group so the decoder can see it.
pub fn encode(payload: &[u8]) -> Bytes {
    let mut dst = BytesMut::with_capacity(max_encoded_len(payload.len()));
    encode_into(payload, &mut dst);
    dst.freeze()
}

/// Byte-stuff `payload` and append it to `dst`.
pub fn encode_into(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(max_encoded_len(payload.len()));

    let mut idx = 0usize;
    while idx < payload.len() {
        let code_pos = dst.len();
        dst.put_u8(0);
        let mut code = 1u8;

        while idx < payload.len() && payload[idx] != DELIMITER && code < MAX_CODE {
            dst.put_u8(payload[idx]);
            idx += 1;
            code += 1;
        }
        dst[code_pos] = code;

        // A full group does not imply a delimiter, so the next zero (if any)
        // starts a group of its own.
        if code < MAX_CODE && idx < payload.len() && payload[idx] == DELIMITER {
            idx += 1;
        }
    }

    if payload.last() == Some(&DELIMITER) {
        dst.put_u8(1);
    }
}

/// Reverse [`encode`].
///
/// Rejects input containing a [`DELIMITER`] or a group whose code points
/// past the end of the buffer rather than returning a shortened payload.
pub fn decode(encoded: &[u8]) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(encoded.len());

    let mut ri = 0usize;
    while ri < encoded.len() {
        let code = encoded[ri];
        if code == DELIMITER {
            return Err(FrameError::Delimiter { offset: ri });
        }
        let offset = ri;
        ri += 1;

        let copy = usize::from(code) - 1;
        if ri + copy > encoded.len() {
            return Err(FrameError::Truncated { offset, code });
        }
        let group = &encoded[ri..ri + copy];
        if let Some(pos) = group.iter().position(|&b| b == DELIMITER) {
            return Err(FrameError::Delimiter { offset: ri + pos });
        }
        out.put_slice(group);
        ri += copy;

        if code != MAX_CODE && ri < encoded.len() {
            out.put_u8(DELIMITER);
        }
    }

    Ok(out.freeze())
}

/// Stuff `payload` and append it to `dst` as a complete, delimited frame.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) {
    encode_into(payload, dst);
    dst.put_u8(DELIMITER);
}

/// Decode the next frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a delimiter yet. On
/// success, consumes the frame bytes including the delimiter. A stuffed
/// frame longer than the bound implied by `max_payload` is rejected as soon
/// as it is observed, delimiter or not. The rejected bytes are dropped: a
/// delimited frame is consumed through its delimiter, an unterminated one
/// clears the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    let max_encoded = max_encoded_len(max_payload);

    let Some(end) = src.iter().position(|&b| b == DELIMITER) else {
        if src.len() > max_encoded {
            src.clear();
            return Err(FrameError::FrameTooLarge { max: max_encoded });
        }
        return Ok(None);
    };
    if end > max_encoded {
        src.advance(end + 1);
        return Err(FrameError::FrameTooLarge { max: max_encoded });
    }

    let frame = src.split_to(end + 1);
    let payload = decode(&frame[..end])?;
    if payload.len() > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: max_payload,
        });
    }
    Ok(Some(payload))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum unstuffed payload size in bytes. Default: 512.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
