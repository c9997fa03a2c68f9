use clap::{Args, Subcommand};
use std::path::PathBuf;

use pxelink_image::{ResolverConfig, DEFAULT_ENTRY_SYMBOL};
use pxelink_session::MAX_CHUNK_SIZE;
use pxelink_transport::DEFAULT_BAUD_RATE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod build;
pub mod inspect;
pub mod pack;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Package a raw binary into a PXE0 container.
    Pack(PackArgs),
    /// Build a PXE0 container from a linked executable.
    Build(BuildArgs),
    /// Transfer a PXE0 container to the device.
    Send(SendArgs),
    /// Show the header of a PXE0 container.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Pack(args) => pack::run(args, format),
        Command::Build(args) => build::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Entry resolution and bss options shared by `pack` and `build`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Uninitialized data size appended by the loader (hex).
    #[arg(long, value_name = "HEX", value_parser = parse_hex, default_value = "0")]
    pub bss: u64,
    /// Address the device maps the payload at (hex).
    #[arg(long, value_name = "HEX", value_parser = parse_hex, default_value = "0x20020000")]
    pub load_base: u64,
    /// Symbol the loader jumps to.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_ENTRY_SYMBOL)]
    pub entry_symbol: String,
}

impl LayoutArgs {
    pub fn resolver(&self) -> ResolverConfig {
        ResolverConfig {
            load_base: self.load_base,
            entry_symbol: self.entry_symbol.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Raw binary payload.
    pub input: PathBuf,
    /// Container file to write.
    pub output: PathBuf,
    /// Entry offset relative to the load base (hex).
    #[arg(
        long,
        value_name = "HEX",
        value_parser = parse_hex,
        required_unless_present = "symbols",
        conflicts_with = "symbols"
    )]
    pub entry: Option<u64>,
    /// Symbol listing (`nm -n` output) to resolve the entry symbol from.
    #[arg(long, value_name = "FILE")]
    pub symbols: Option<PathBuf>,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Linked executable (ELF).
    pub executable: PathBuf,
    /// Container file to write.
    pub output: PathBuf,
    /// Cross toolchain prefix (`<prefix>-objcopy`, `<prefix>-nm`).
    #[arg(
        long,
        value_name = "PREFIX",
        env = "PXELINK_TOOLCHAIN_PREFIX",
        default_value = "arm-none-eabi"
    )]
    pub toolchain_prefix: String,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial device (or a regular file to capture the byte stream).
    pub port: PathBuf,
    /// PXE0 container to transfer.
    pub file: PathBuf,
    /// Destination name on the device, e.g. `A:\HELLO.PXE`.
    pub name: String,
    /// Line speed.
    #[arg(long, env = "PXELINK_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Pause after opening the port before the first frame (e.g. 200ms, 1s).
    #[arg(long, default_value = "200ms")]
    pub settle_delay: String,
    /// Image bytes per DATA message.
    #[arg(long, default_value_t = MAX_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Send the file even if it does not parse as a PXE0 container.
    #[arg(long)]
    pub skip_verify: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// PXE0 container to read.
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a hexadecimal value, with or without a `0x` prefix.
pub fn parse_hex(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if digits.is_empty() {
        return Err("hex value must not be empty".to_string());
    }
    u64::from_str_radix(digits, 16).map_err(|_| format!("invalid hex value: {input}"))
}
