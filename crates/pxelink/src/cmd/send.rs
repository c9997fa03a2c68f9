use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use pxelink_frame::FrameWriter;
use pxelink_image::PackagedImage;
use pxelink_session::{validate_name, SessionConfig, TransferSession, MAX_CHUNK_SIZE};
use pxelink_transport::{SerialChannel, SerialConfig};
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd::SendArgs;
use crate::exit::{
    image_error, io_error, session_error, transport_error, CliError, CliResult, SUCCESS, USAGE,
};
use crate::output::{hex32, print_record, OutputFormat, Record};

#[derive(Serialize)]
struct SendOutput {
    port: PathBuf,
    channel: &'static str,
    name: String,
    total_size: u32,
    digest: u32,
    data_frames: u32,
    end_seq: u32,
    frames: u64,
    wire_bytes: u64,
}

impl Record for SendOutput {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("port", self.port.display().to_string()),
            ("channel", self.channel.to_string()),
            ("name", self.name.clone()),
            ("total_size", self.total_size.to_string()),
            ("digest", hex32(self.digest)),
            ("data_frames", self.data_frames.to_string()),
            ("end_seq", self.end_seq.to_string()),
            ("frames", self.frames.to_string()),
            ("wire_bytes", self.wire_bytes.to_string()),
        ]
    }

    fn summary(&self) -> String {
        format!("sent {} bytes, frames={}", self.total_size, self.frames)
    }
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let settle_delay = parse_duration(&args.settle_delay)?;
    if args.chunk_size == 0 || args.chunk_size > MAX_CHUNK_SIZE {
        return Err(CliError::new(
            USAGE,
            format!("--chunk-size must be between 1 and {MAX_CHUNK_SIZE}"),
        ));
    }
    validate_name(&args.name).map_err(|err| session_error("invalid destination name", err))?;

    let bytes = fs::read(&args.file)
        .map_err(|err| io_error(&format!("failed reading {}", args.file.display()), err))?;
    let image = load_image(bytes, args.skip_verify)?;

    let config = SerialConfig {
        baud_rate: args.baud,
        settle_delay,
    };
    let channel = SerialChannel::open(&args.port, &config)
        .map_err(|err| transport_error("open failed", err))?;
    let kind = channel.kind();
    info!(port = %args.port.display(), kind = kind.as_str(), "channel open");

    let mut session = TransferSession::with_config(
        FrameWriter::new(channel),
        SessionConfig {
            chunk_size: args.chunk_size,
        },
    );
    let report = session
        .transfer(&args.name, &image)
        .map_err(|err| session_error("send failed", err))?;

    print_record(
        &SendOutput {
            port: args.port,
            channel: kind.as_str(),
            name: args.name,
            total_size: report.total_size,
            digest: report.digest,
            data_frames: report.data_frames,
            end_seq: report.end_seq,
            frames: report.frames_sent,
            wire_bytes: report.wire_bytes,
        },
        format,
    );
    Ok(SUCCESS)
}

fn load_image(bytes: Vec<u8>, skip_verify: bool) -> CliResult<Bytes> {
    if skip_verify {
        warn!(len = bytes.len(), "sending file without container checks");
        return Ok(Bytes::from(bytes));
    }
    let image = PackagedImage::parse(bytes).map_err(|err| image_error("invalid container", err))?;
    Ok(image.into_bytes())
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
