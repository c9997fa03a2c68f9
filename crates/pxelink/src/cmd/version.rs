use pxelink_image::{HEADER_SIZE, VERSION};
use pxelink_session::MAX_CHUNK_SIZE;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("pxelink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: pxelink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "build_target: {}",
        option_env!("PXELINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("container: PXE0 v{VERSION} (header {HEADER_SIZE} bytes)");
    println!("max_chunk: {MAX_CHUNK_SIZE}");

    Ok(SUCCESS)
}
