use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ImageError, Result};

/// Header size in bytes. The payload starts at this offset.
pub const HEADER_SIZE: usize = 32;

/// Container magic, stored little-endian as the bytes `50 45 58 30` ("PEX0").
pub const MAGIC: u32 = 0x3058_4550;

/// Container format version understood by the device loader.
pub const VERSION: u16 = 1;

/// The fixed container header.
///
/// Layout (all fields little-endian):
/// ```text
/// ┌────────┬──────┬─────────────────────────┐
/// │ Offset │ Size │ Field                   │
/// ├────────┼──────┼─────────────────────────┤
/// │ 0      │ 4    │ magic 0x30584550        │
/// │ 4      │ 2    │ format version          │
/// │ 6      │ 2    │ flags (reserved, zero)  │
/// │ 8      │ 4    │ payload size            │
/// │ 12     │ 4    │ bss size                │
/// │ 16     │ 4    │ entry offset            │
/// │ 20     │ 12   │ reserved (3 × u32, zero)│
/// └────────┴──────┴─────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub version: u16,
    pub flags: u16,
    pub payload_size: u32,
    pub bss_size: u32,
    pub entry_offset: u32,
    pub reserved: [u32; 3],
}

impl ImageHeader {
    /// A current-version header with flags and reserved fields zeroed.
    pub fn new(payload_size: u32, bss_size: u32, entry_offset: u32) -> Self {
        Self {
            version: VERSION,
            flags: 0,
            payload_size,
            bss_size,
            entry_offset,
            reserved: [0; 3],
        }
    }

    /// Total bytes the loader maps at the load base (payload plus zeroed bss).
    pub fn mapped_size(&self) -> u64 {
        u64::from(self.payload_size) + u64::from(self.bss_size)
    }

    /// Check that the entry point lies inside the mapped image.
    pub fn check_entry(&self) -> Result<()> {
        let entry = u64::from(self.entry_offset);
        let mapped = self.mapped_size();
        if entry >= mapped {
            return Err(ImageError::EntryOutOfRange { entry, mapped });
        }
        Ok(())
    }

    /// Append the encoded header to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(HEADER_SIZE);
        dst.put_u32_le(MAGIC);
        dst.put_u16_le(self.version);
        dst.put_u16_le(self.flags);
        dst.put_u32_le(self.payload_size);
        dst.put_u32_le(self.bss_size);
        dst.put_u32_le(self.entry_offset);
        for word in self.reserved {
            dst.put_u32_le(word);
        }
    }

    /// Parse and validate the header at the start of `src`.
    ///
    /// Only magic and version are checked here; flags and reserved words are
    /// carried through untouched so newer containers can still be inspected.
    pub fn parse(src: &[u8]) -> Result<Self> {
        if src.len() < HEADER_SIZE {
            return Err(ImageError::TooShort { len: src.len() });
        }

        let mut buf = &src[..HEADER_SIZE];
        let magic = buf.get_u32_le();
        if magic != MAGIC {
            return Err(ImageError::BadMagic(magic));
        }
        let version = buf.get_u16_le();
        if version != VERSION {
            return Err(ImageError::UnsupportedVersion(version));
        }

        Ok(Self {
            version,
            flags: buf.get_u16_le(),
            payload_size: buf.get_u32_le(),
            bss_size: buf.get_u32_le(),
            entry_offset: buf.get_u32_le(),
            reserved: [buf.get_u32_le(), buf.get_u32_le(), buf.get_u32_le()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(header: &ImageHeader) -> BytesMut {
        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        buf
    }

    #[test]
    fn test_field_offsets() {
        let buf = encoded(&ImageHeader::new(0x0102_0304, 0x1112_1314, 0x2122_2324));

        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[0..4], &MAGIC.to_le_bytes());
        assert_eq!(&buf[4..6], &[0x01, 0x00]);
        assert_eq!(&buf[6..8], &[0x00, 0x00]);
        assert_eq!(&buf[8..12], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&buf[12..16], &[0x14, 0x13, 0x12, 0x11]);
        assert_eq!(&buf[16..20], &[0x24, 0x23, 0x22, 0x21]);
        assert_eq!(&buf[20..32], &[0u8; 12]);
    }

    #[test]
    fn test_parse_encoded() {
        let header = ImageHeader::new(500, 64, 0x54);
        let parsed = ImageHeader::parse(&encoded(&header)).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.mapped_size(), 564);
    }

    #[test]
    fn test_parse_too_short() {
        let err = ImageHeader::parse(&[0x50, 0x45, 0x58]).unwrap_err();
        assert!(matches!(err, ImageError::TooShort { len: 3 }));
    }

    #[test]
    fn test_parse_bad_magic() {
        let mut buf = encoded(&ImageHeader::new(1, 0, 0));
        buf[0] = b'X';
        let err = ImageHeader::parse(&buf).unwrap_err();
        assert!(matches!(err, ImageError::BadMagic(_)));
    }

    #[test]
    fn test_parse_unsupported_version() {
        let mut buf = encoded(&ImageHeader::new(1, 0, 0));
        buf[4] = 2;
        let err = ImageHeader::parse(&buf).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_parse_keeps_reserved_words() {
        let mut header = ImageHeader::new(8, 0, 0);
        header.flags = 0x8000;
        header.reserved = [1, 2, 3];
        let parsed = ImageHeader::parse(&encoded(&header)).unwrap();
        assert_eq!(parsed.flags, 0x8000);
        assert_eq!(parsed.reserved, [1, 2, 3]);
    }

    #[test]
    fn test_entry_range() {
        assert!(ImageHeader::new(16, 0, 15).check_entry().is_ok());
        assert!(ImageHeader::new(16, 16, 31).check_entry().is_ok());
        assert!(matches!(
            ImageHeader::new(16, 0, 16).check_entry(),
            Err(ImageError::EntryOutOfRange {
                entry: 16,
                mapped: 16
            })
        ));
    }
}
