//! Begin/data/end image transfer over a framed serial channel.
//!
//! A session pushes one packaged image to the device and is fire-and-forget:
//! there is no acknowledgment, retry, or flow control. Every message travels
//! in its own stuffed frame and the channel is flushed after each one.
//!
//! ```text
//! BEGIN seq=0  name_len total_size digest name
//! DATA  seq=1  chunk_len chunk (≤240 bytes)
//! DATA  seq=2  ...
//! END   seq=n+1
//! ```

pub mod digest;
pub mod error;
pub mod message;
pub mod session;

pub use digest::{digest, Digest, DIGEST_SEED};
pub use error::{Result, SessionError};
pub use message::{
    Message, BEGIN_HEADER_LEN, DATA_HEADER_LEN, END_LEN, MAX_CHUNK_SIZE, MAX_NAME_LEN, MSG_BEGIN,
    MSG_DATA, MSG_END,
};
pub use session::{validate_name, SessionConfig, TransferReport, TransferSession};
