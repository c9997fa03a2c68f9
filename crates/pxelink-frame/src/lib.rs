//! Zero-delimited, byte-stuffed framing for serial links.
//!
//! Every message is stuffed with consistent overhead byte stuffing (COBS) so
//! that it contains no `0x00`, then terminated by a single `0x00`:
//! - frames are self-delimiting, a receiver resynchronizes at the next zero
//! - overhead is one byte per 254 payload bytes, plus one
//!
//! No partial writes, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode, decode_frame, encode, encode_frame, encode_into, max_encoded_len, FrameConfig,
    DEFAULT_MAX_PAYLOAD, DELIMITER, MAX_CODE, MAX_GROUP_LEN,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
