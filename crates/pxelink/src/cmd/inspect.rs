use std::fs;
use std::path::PathBuf;

use pxelink_image::{LoaderLimits, PackagedImage};
use pxelink_session::digest;
use serde::Serialize;

use crate::cmd::InspectArgs;
use crate::exit::{image_error, io_error, CliResult, SUCCESS};
use crate::output::{hex32, print_record, OutputFormat, Record};

#[derive(Serialize)]
struct InspectOutput {
    path: PathBuf,
    version: u16,
    flags: u16,
    total_size: usize,
    payload_size: u32,
    bss_size: u32,
    entry_offset: u32,
    mapped_size: u64,
    digest: u32,
    fits_app_region: bool,
}

impl Record for InspectOutput {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("path", self.path.display().to_string()),
            ("version", self.version.to_string()),
            ("flags", format!("{:#06x}", self.flags)),
            ("total_size", self.total_size.to_string()),
            ("payload_size", self.payload_size.to_string()),
            ("bss_size", hex32(self.bss_size)),
            ("entry_offset", hex32(self.entry_offset)),
            ("mapped_size", self.mapped_size.to_string()),
            ("digest", hex32(self.digest)),
            ("fits_app_region", self.fits_app_region.to_string()),
        ]
    }

    fn summary(&self) -> String {
        format!(
            "PXE0 v{} image={} bss={:#x} entry_off={:#x}",
            self.version, self.payload_size, self.bss_size, self.entry_offset
        )
    }
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = fs::read(&args.file)
        .map_err(|err| io_error(&format!("failed reading {}", args.file.display()), err))?;
    let image = PackagedImage::parse(bytes).map_err(|err| image_error("invalid container", err))?;
    let header = image.header();

    let out = InspectOutput {
        path: args.file,
        version: header.version,
        flags: header.flags,
        total_size: image.len(),
        payload_size: header.payload_size,
        bss_size: header.bss_size,
        entry_offset: header.entry_offset,
        mapped_size: header.mapped_size(),
        digest: digest(image.as_bytes()),
        fits_app_region: LoaderLimits::default().fits(header),
    };
    print_record(&out, format);
    Ok(SUCCESS)
}
