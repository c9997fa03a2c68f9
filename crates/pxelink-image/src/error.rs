/// Errors that can occur while building or reading an image container.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// A header field value does not fit its 32-bit slot.
    #[error("{field} value {value:#x} does not fit in 32 bits")]
    InvalidHeaderField { field: &'static str, value: u64 },

    /// The buffer is shorter than a header.
    #[error("image too short for header ({len} bytes, need 32)")]
    TooShort { len: usize },

    /// The header does not start with the container magic.
    #[error("invalid image magic {0:#010x} (expected 0x30584550)")]
    BadMagic(u32),

    /// The header carries a format version this build does not understand.
    #[error("unsupported image format version {0}")]
    UnsupportedVersion(u16),

    /// The declared payload size disagrees with the bytes that follow the header.
    #[error("payload size mismatch (header declares {declared} bytes, found {actual})")]
    SizeMismatch { declared: u64, actual: u64 },

    /// The entry offset points outside the mapped image.
    #[error("entry offset {entry:#x} outside mapped image of {mapped} bytes")]
    EntryOutOfRange { entry: u64, mapped: u64 },

    /// The entry symbol lies below the load base address.
    #[error("entry address {address:#x} is below load base {base:#x}")]
    EntryBelowBase { address: u64, base: u64 },

    /// The entry symbol is missing from the symbol listing.
    #[error("symbol {0:?} not found in symbol listing")]
    SymbolNotFound(String),

    /// The external toolchain failed.
    #[error("toolchain error: {0}")]
    Toolchain(String),

    /// An I/O error occurred while reading or writing image files.
    #[error("image I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImageError>;
