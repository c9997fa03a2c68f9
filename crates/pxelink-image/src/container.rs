use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::error::{ImageError, Result};
use crate::header::{ImageHeader, HEADER_SIZE};

/// Size of the device's application region at the load base: 64 KiB.
pub const DEFAULT_APP_REGION_SIZE: u64 = 64 * 1024;

/// Limits enforced by the device loader when it maps a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderLimits {
    /// Bytes available for payload plus bss at the load base.
    pub app_region_size: u64,
}

impl LoaderLimits {
    /// Whether the loader will accept an image with this header.
    pub fn fits(&self, header: &ImageHeader) -> bool {
        header.mapped_size() <= self.app_region_size
    }
}

impl Default for LoaderLimits {
    fn default() -> Self {
        Self {
            app_region_size: DEFAULT_APP_REGION_SIZE,
        }
    }
}

/// A complete container: header followed by the payload, as one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedImage {
    header: ImageHeader,
    bytes: Bytes,
}

impl PackagedImage {
    /// Parse a container, checking that the trailing payload matches the
    /// declared size exactly and that the entry point is mapped.
    pub fn parse(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        let header = ImageHeader::parse(&bytes)?;

        let actual = (bytes.len() - HEADER_SIZE) as u64;
        let declared = u64::from(header.payload_size);
        if actual != declared {
            return Err(ImageError::SizeMismatch { declared, actual });
        }
        header.check_entry()?;

        Ok(Self { header, bytes })
    }

    /// The container header.
    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    /// The raw payload following the header.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..]
    }

    /// The whole container, header included.
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Total container length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a container holds at least its header.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the image and return the container bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Assemble a container from a raw payload.
///
/// `entry_offset` and `bss_size` are taken wide so that values produced by
/// address arithmetic are range-checked here rather than silently truncated.
pub fn pack(payload: &[u8], entry_offset: u64, bss_size: u64) -> Result<PackagedImage> {
    let payload_size = narrow("payload_size", payload.len() as u64)?;
    let bss_size = narrow("bss_size", bss_size)?;
    let entry_offset = narrow("entry_offset", entry_offset)?;

    let header = ImageHeader::new(payload_size, bss_size, entry_offset);
    header.check_entry()?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    header.encode(&mut buf);
    buf.put_slice(payload);

    debug!(
        payload_size,
        bss_size,
        entry_offset = format_args!("{entry_offset:#x}"),
        "image packed"
    );

    Ok(PackagedImage {
        header,
        bytes: buf.freeze(),
    })
}

fn narrow(field: &'static str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| ImageError::InvalidHeaderField { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::MAGIC;

    #[test]
    fn test_pack_layout() {
        let payload: Vec<u8> = (0..500u32).map(|i| (i % 251) as u8).collect();
        let image = pack(&payload, 0x54, 0).unwrap();

        assert_eq!(image.len(), 532);
        assert_eq!(image.payload(), payload.as_slice());

        let bytes = image.as_bytes();
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), MAGIC);
        assert_eq!(u16::from_le_bytes(bytes[4..6].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 500);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 0);
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 0x54);
        assert!(bytes[20..32].iter().all(|&b| b == 0));
        assert_eq!(&bytes[32..], payload.as_slice());
    }

    #[test]
    fn test_pack_then_parse() {
        let image = pack(b"\x00\x01\x02\x03", 2, 0x100).unwrap();
        let parsed = PackagedImage::parse(image.as_bytes().clone()).unwrap();
        assert_eq!(parsed, image);
        assert_eq!(parsed.header().bss_size, 0x100);
    }

    #[test]
    fn test_entry_may_point_into_bss() {
        let image = pack(b"\x01\x02", 0x10, 0x20).unwrap();
        assert_eq!(image.header().entry_offset, 0x10);
    }

    #[test]
    fn test_pack_rejects_unmapped_entry() {
        let err = pack(b"\x01\x02", 2, 0).unwrap_err();
        assert!(matches!(err, ImageError::EntryOutOfRange { entry: 2, mapped: 2 }));
    }

    #[test]
    fn test_pack_rejects_empty_image() {
        let err = pack(b"", 0, 0).unwrap_err();
        assert!(matches!(err, ImageError::EntryOutOfRange { entry: 0, mapped: 0 }));

        let image = pack(b"", 0, 4).unwrap();
        assert_eq!(image.len(), HEADER_SIZE);
    }

    #[test]
    fn test_pack_rejects_wide_fields() {
        let err = pack(b"\x01", 0, 1 << 32).unwrap_err();
        assert!(matches!(
            err,
            ImageError::InvalidHeaderField {
                field: "bss_size",
                ..
            }
        ));

        let err = pack(b"\x01", u64::from(u32::MAX) + 1, 0).unwrap_err();
        assert!(matches!(
            err,
            ImageError::InvalidHeaderField {
                field: "entry_offset",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_size_mismatch() {
        let image = pack(b"abcd", 0, 0).unwrap();
        let mut bytes = image.as_bytes().to_vec();
        bytes.push(0xEE);
        let err = PackagedImage::parse(bytes).unwrap_err();
        assert!(matches!(
            err,
            ImageError::SizeMismatch {
                declared: 4,
                actual: 5
            }
        ));

        let truncated = image.as_bytes().slice(..34);
        let err = PackagedImage::parse(truncated).unwrap_err();
        assert!(matches!(
            err,
            ImageError::SizeMismatch {
                declared: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_loader_limits() {
        let limits = LoaderLimits::default();
        assert!(limits.fits(&ImageHeader::new(60 * 1024, 4 * 1024, 0)));
        assert!(!limits.fits(&ImageHeader::new(60 * 1024, 4 * 1024 + 1, 0)));
    }
}
