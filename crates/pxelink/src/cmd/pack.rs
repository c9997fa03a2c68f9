use std::fs;
use std::path::{Path, PathBuf};

use pxelink_image::{pack, resolve_entry, LoaderLimits, PackagedImage, SymbolTable};
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd::PackArgs;
use crate::exit::{image_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{hex32, print_record, OutputFormat, Record};

#[derive(Serialize)]
pub struct PackOutput {
    output: PathBuf,
    total_size: usize,
    payload_size: u32,
    bss_size: u32,
    entry_offset: u32,
    fits_app_region: bool,
}

impl Record for PackOutput {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("output", self.output.display().to_string()),
            ("total_size", self.total_size.to_string()),
            ("payload_size", self.payload_size.to_string()),
            ("bss_size", hex32(self.bss_size)),
            ("entry_offset", hex32(self.entry_offset)),
            ("fits_app_region", self.fits_app_region.to_string()),
        ]
    }

    fn summary(&self) -> String {
        format!(
            "wrote {}: image={} entry_off={:#x} bss={:#x}",
            self.output.display(),
            self.payload_size,
            self.entry_offset,
            self.bss_size
        )
    }
}

pub fn run(args: PackArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = fs::read(&args.input)
        .map_err(|err| io_error(&format!("failed reading {}", args.input.display()), err))?;

    let entry_offset = match (args.entry, &args.symbols) {
        (Some(entry), _) => entry,
        (None, Some(path)) => {
            let listing = fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            let table = SymbolTable::parse(&String::from_utf8_lossy(&listing));
            resolve_entry(&table, &args.layout.resolver())
                .map_err(|err| image_error("entry resolution failed", err))?
        }
        (None, None) => {
            return Err(CliError::new(USAGE, "either --entry or --symbols is required"));
        }
    };

    let image = pack(&payload, entry_offset, args.layout.bss)
        .map_err(|err| image_error("pack failed", err))?;
    let out = write_image(&args.output, &image)?;
    print_record(&out, format);
    Ok(SUCCESS)
}

/// Write a container to disk and describe it.
pub fn write_image(path: &Path, image: &PackagedImage) -> CliResult<PackOutput> {
    fs::write(path, image.as_bytes())
        .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;

    let header = image.header();
    let fits_app_region = LoaderLimits::default().fits(header);
    if !fits_app_region {
        warn!(
            mapped_size = header.mapped_size(),
            "image is larger than the device app region"
        );
    }
    info!(path = %path.display(), size = image.len(), "container written");

    Ok(PackOutput {
        output: path.to_path_buf(),
        total_size: image.len(),
        payload_size: header.payload_size,
        bss_size: header.bss_size,
        entry_offset: header.entry_offset,
        fits_app_region,
    })
}
