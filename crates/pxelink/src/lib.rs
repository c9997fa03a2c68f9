//! Package PXE0 application images and push them to a device over serial.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial channel (raw 8N1 tty, or a plain file for capture)
//! - [`frame`]: byte stuffing codec and delimited frame reader/writer
//! - [`image`]: PXE0 container format, symbol listings, entry resolution
//! - [`session`]: begin/data/end transfer with the rolling digest
//! - [`toolchain`]: GNU binutils adapter used to build from an executable

/// Re-export transport types.
pub mod transport {
    pub use pxelink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pxelink_frame::*;
}

/// Re-export image types.
pub mod image {
    pub use pxelink_image::*;
}

/// Re-export session types.
pub mod session {
    pub use pxelink_session::*;
}

pub mod toolchain;

pub use toolchain::GnuToolchain;
