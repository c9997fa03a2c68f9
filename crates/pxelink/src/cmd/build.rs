use pxelink::GnuToolchain;
use pxelink_image::build_from_executable;

use crate::cmd::pack::write_image;
use crate::cmd::BuildArgs;
use crate::exit::{image_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(args: BuildArgs, format: OutputFormat) -> CliResult<i32> {
    let toolchain = GnuToolchain::new(args.toolchain_prefix);
    let image = build_from_executable(
        &toolchain,
        &args.executable,
        &args.layout.resolver(),
        args.layout.bss,
    )
    .map_err(|err| image_error("build failed", err))?;

    let out = write_image(&args.output, &image)?;
    print_record(&out, format);
    Ok(SUCCESS)
}
