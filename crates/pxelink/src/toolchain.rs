//! GNU binutils adapter for [`Toolchain`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pxelink_image::{ImageError, Result, SymbolTable, Toolchain};
use tracing::debug;

/// Runs `<prefix>-objcopy` and `<prefix>-nm` from a cross toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnuToolchain {
    prefix: String,
}

impl GnuToolchain {
    /// Toolchain whose tools are named `<prefix>-objcopy` and `<prefix>-nm`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Tool prefix, e.g. `arm-none-eabi`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the `objcopy` binary.
    pub fn objcopy(&self) -> String {
        format!("{}-objcopy", self.prefix)
    }

    /// Name of the `nm` binary.
    pub fn nm(&self) -> String {
        format!("{}-nm", self.prefix)
    }

    /// Where the flat binary is written: next to the executable, `.bin` extension.
    pub fn binary_path(executable: &Path) -> PathBuf {
        executable.with_extension("bin")
    }
}

impl Default for GnuToolchain {
    fn default() -> Self {
        Self::new("arm-none-eabi")
    }
}

impl Toolchain for GnuToolchain {
    fn extract_binary(&self, executable: &Path) -> Result<Vec<u8>> {
        let bin_path = Self::binary_path(executable);
        let program = self.objcopy();
        run(
            &program,
            [
                OsStr::new("-O"),
                OsStr::new("binary"),
                executable.as_os_str(),
                bin_path.as_os_str(),
            ],
        )?;
        let binary = std::fs::read(&bin_path)?;
        debug!(
            path = %bin_path.display(),
            len = binary.len(),
            "flat binary extracted"
        );
        Ok(binary)
    }

    fn symbol_table(&self, executable: &Path) -> Result<SymbolTable> {
        let program = self.nm();
        let output = run(&program, [OsStr::new("-n"), executable.as_os_str()])?;
        let listing = String::from_utf8_lossy(&output.stdout);
        let table = SymbolTable::parse(&listing);
        debug!(symbols = table.len(), "symbol listing read");
        Ok(table)
    }
}

fn run<'a>(program: &str, args: impl IntoIterator<Item = &'a OsStr>) -> Result<Output> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| ImageError::Toolchain(format!("failed to run {program}: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ImageError::Toolchain(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}
