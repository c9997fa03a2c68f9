use tracing::{debug, warn};

use crate::error::{ImageError, Result};

/// Address the device loader maps the payload at (matches the app linker script).
pub const DEFAULT_LOAD_BASE: u64 = 0x2002_0000;

/// Symbol the loader jumps to.
pub const DEFAULT_ENTRY_SYMBOL: &str = "app_entry";

/// One record of a symbol listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub address: u64,
    /// Single-letter symbol class as printed by `nm` (`T`, `t`, `D`, ...).
    pub kind: char,
    pub name: String,
}

/// An ordered symbol listing, as produced by `nm -n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Build a table from records, keeping their order.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Parse `nm` text output.
    ///
    /// Each useful line reads `<hex address> <class letter> <name>`. Anything
    /// else (undefined symbols without an address, headers, blank lines) is
    /// skipped.
    pub fn parse(listing: &str) -> Self {
        let symbols = listing.lines().filter_map(parse_line).collect();
        Self { symbols }
    }

    /// All records in listing order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if the listing had no usable records.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// First record named `name`, in listing order.
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }
}

fn parse_line(line: &str) -> Option<Symbol> {
    let mut fields = line.split_whitespace();
    let address = fields.next()?;
    let kind = fields.next()?;
    let name = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let address = u64::from_str_radix(address, 16).ok()?;
    let mut chars = kind.chars();
    let kind = chars.next()?;
    if chars.next().is_some() || !(kind.is_ascii_alphanumeric() || kind == '_') {
        return None;
    }

    Some(Symbol {
        address,
        kind,
        name: name.to_string(),
    })
}

/// Where the loader maps the image and which symbol it enters through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub load_base: u64,
    pub entry_symbol: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            load_base: DEFAULT_LOAD_BASE,
            entry_symbol: DEFAULT_ENTRY_SYMBOL.to_string(),
        }
    }
}

/// Compute the entry offset relative to the load base.
///
/// When the symbol is listed more than once the first record wins.
pub fn resolve_entry(table: &SymbolTable, config: &ResolverConfig) -> Result<u64> {
    let symbol = table
        .find(&config.entry_symbol)
        .ok_or_else(|| ImageError::SymbolNotFound(config.entry_symbol.clone()))?;

    let duplicates = table
        .symbols()
        .iter()
        .filter(|s| s.name == config.entry_symbol)
        .count();
    if duplicates > 1 {
        warn!(
            symbol = %config.entry_symbol,
            count = duplicates,
            "entry symbol listed more than once, using first"
        );
    }

    let offset = symbol
        .address
        .checked_sub(config.load_base)
        .ok_or(ImageError::EntryBelowBase {
            address: symbol.address,
            base: config.load_base,
        })?;

    debug!(
        symbol = %config.entry_symbol,
        address = format_args!("{:#x}", symbol.address),
        offset = format_args!("{offset:#x}"),
        "entry symbol resolved"
    );
    Ok(offset)
}
