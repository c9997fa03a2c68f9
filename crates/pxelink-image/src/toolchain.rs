use std::path::Path;

use tracing::info;

use crate::container::{pack, PackagedImage};
use crate::error::Result;
use crate::symbols::{resolve_entry, ResolverConfig, SymbolTable};

/// External toolchain that turns a linked executable into a flat binary and
/// a symbol listing.
///
/// Implementations typically shell out to `objcopy` and `nm`; tests supply
/// canned data.
pub trait Toolchain {
    /// Raw memory image of the executable's loadable sections.
    fn extract_binary(&self, executable: &Path) -> Result<Vec<u8>>;

    /// Symbol listing of the executable, in address order.
    fn symbol_table(&self, executable: &Path) -> Result<SymbolTable>;
}

/// Build a container straight from an executable.
pub fn build_from_executable<T: Toolchain + ?Sized>(
    toolchain: &T,
    executable: &Path,
    resolver: &ResolverConfig,
    bss_size: u64,
) -> Result<PackagedImage> {
    let payload = toolchain.extract_binary(executable)?;
    let symbols = toolchain.symbol_table(executable)?;
    let entry_offset = resolve_entry(&symbols, resolver)?;
    let image = pack(&payload, entry_offset, bss_size)?;

    info!(
        executable = %executable.display(),
        payload_size = payload.len(),
        entry_offset = format_args!("{entry_offset:#x}"),
        "image built from executable"
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::ImageError;
    use crate::symbols::Symbol;

    struct CannedToolchain {
        binary: Vec<u8>,
        listing: &'static str,
        calls: Cell<usize>,
    }

    impl Toolchain for CannedToolchain {
        fn extract_binary(&self, _executable: &Path) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.binary.clone())
        }

        fn symbol_table(&self, _executable: &Path) -> Result<SymbolTable> {
            self.calls.set(self.calls.get() + 1);
            Ok(SymbolTable::parse(self.listing))
        }
    }

    struct BrokenToolchain;

    impl Toolchain for BrokenToolchain {
        fn extract_binary(&self, _executable: &Path) -> Result<Vec<u8>> {
            Err(ImageError::Toolchain("objcopy exited with status 1".to_string()))
        }

        fn symbol_table(&self, _executable: &Path) -> Result<SymbolTable> {
            Ok(SymbolTable::new(vec![Symbol {
                address: 0x2002_0000,
                kind: 'T',
                name: "app_entry".to_string(),
            }]))
        }
    }

    #[test]
    fn builds_container_from_toolchain_output() {
        let toolchain = CannedToolchain {
            binary: vec![0xA5; 500],
            listing: "20020000 T _start\n20020054 T app_entry\n",
            calls: Cell::new(0),
        };

        let image = build_from_executable(
            &toolchain,
            Path::new("app.elf"),
            &ResolverConfig::default(),
            0,
        )
        .unwrap();

        assert_eq!(toolchain.calls.get(), 2);
        assert_eq!(image.len(), 532);
        assert_eq!(image.header().entry_offset, 0x54);
        assert_eq!(image.header().payload_size, 500);
    }

    #[test]
    fn missing_entry_symbol_aborts() {
        let toolchain = CannedToolchain {
            binary: vec![0xA5; 16],
            listing: "20020000 T _start\n",
            calls: Cell::new(0),
        };

        let err = build_from_executable(
            &toolchain,
            Path::new("app.elf"),
            &ResolverConfig::default(),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ImageError::SymbolNotFound(_)));
    }

    #[test]
    fn toolchain_failure_propagates() {
        let err = build_from_executable(
            &BrokenToolchain,
            Path::new("app.elf"),
            &ResolverConfig::default(),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ImageError::Toolchain(_)));
    }
}
