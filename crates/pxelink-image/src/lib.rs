//! PXE0 image container format and entry-point resolution.
//!
//! A container is a fixed 32-byte little-endian header followed by the raw
//! payload the device copies to its load base. Building one is a pipeline of
//! pure steps:
//! - [`SymbolTable`] + [`ResolverConfig`] → entry offset ([`resolve_entry`])
//! - payload + entry offset + bss size → [`PackagedImage`] ([`pack`])
//!
//! Extraction of the raw binary and symbol listing from an executable is
//! delegated to a [`Toolchain`] supplied by the caller.

pub mod container;
pub mod error;
pub mod header;
pub mod symbols;
pub mod toolchain;

pub use container::{pack, LoaderLimits, PackagedImage, DEFAULT_APP_REGION_SIZE};
pub use error::{ImageError, Result};
pub use header::{ImageHeader, HEADER_SIZE, MAGIC, VERSION};
pub use symbols::{
    resolve_entry, ResolverConfig, Symbol, SymbolTable, DEFAULT_ENTRY_SYMBOL, DEFAULT_LOAD_BASE,
};
pub use toolchain::{build_from_executable, Toolchain};
