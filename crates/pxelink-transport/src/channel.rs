use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Result, TransportError};

/// What kind of object a channel path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// A terminal device configured for raw serial I/O.
    Tty,
    /// A plain file receiving the raw wire bytes.
    File,
}

impl ChannelKind {
    /// Name for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Tty => "tty",
            ChannelKind::File => "file",
        }
    }
}

/// An exclusively owned, write-side serial channel.
///
/// `flush` on a terminal blocks until the output queue has been transmitted,
/// so a caller that flushes after every frame never has more than one frame
/// in flight.
pub struct SerialChannel {
    file: File,
    kind: ChannelKind,
    path: PathBuf,
}

impl SerialChannel {
    /// Open `path` and apply `config` if it is a terminal device.
    ///
    /// Regular files are truncated so that the channel holds exactly the bytes
    /// of this session.
    pub fn open(path: impl AsRef<Path>, config: &SerialConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_options()
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        #[cfg(unix)]
        if crate::termios::is_tty(&file) {
            let speed = crate::termios::speed_for(config.baud_rate)
                .ok_or(TransportError::UnsupportedBaudRate(config.baud_rate))?;
            crate::termios::configure_raw(&file, speed).map_err(|source| {
                TransportError::Configure {
                    path: path.clone(),
                    source,
                }
            })?;
            info!(?path, baud = config.baud_rate, "serial channel configured");

            if !config.settle_delay.is_zero() {
                std::thread::sleep(config.settle_delay);
            }
            return Ok(Self {
                file,
                kind: ChannelKind::Tty,
                path,
            });
        }

        #[cfg(not(unix))]
        let _ = config;

        let is_file = file
            .metadata()
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?
            .is_file();
        if is_file {
            file.set_len(0).map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;
        }
        debug!(?path, "channel is not a terminal, writing raw bytes");

        Ok(Self {
            file,
            kind: ChannelKind::File,
            path,
        })
    }

    /// The path this channel was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the channel is a terminal or a plain file.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }
}

#[cfg(unix)]
fn open_options() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.write(true).custom_flags(libc::O_NOCTTY);
    options
}

#[cfg(not(unix))]
fn open_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true);
    options
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()?;
        match self.kind {
            #[cfg(unix)]
            ChannelKind::Tty => crate::termios::drain(&self.file),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("path", &self.path)
            .field("kind", &self.kind.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pxelink-channel-{tag}-{}", std::process::id()))
    }

    #[test]
    fn missing_path_is_open_error() {
        let path = temp_path("missing").join("nope");
        let err = SerialChannel::open(&path, &SerialConfig::default()).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
    }

    #[test]
    fn plain_file_receives_bytes() {
        let path = temp_path("plain");
        std::fs::write(&path, b"stale contents from a previous run").unwrap();

        let mut channel = SerialChannel::open(&path, &SerialConfig::default()).unwrap();
        assert_eq!(channel.kind(), ChannelKind::File);
        assert_eq!(channel.path(), path.as_path());

        channel.write_all(b"\x02\x01\x00").unwrap();
        channel.flush().unwrap();
        drop(channel);

        assert_eq!(std::fs::read(&path).unwrap(), b"\x02\x01\x00");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn plain_file_ignores_baud_rate() {
        let path = temp_path("baud");
        std::fs::write(&path, b"").unwrap();

        let config = SerialConfig {
            baud_rate: 12_345,
            ..SerialConfig::default()
        };
        let channel = SerialChannel::open(&path, &config).unwrap();
        assert_eq!(channel.kind(), ChannelKind::File);
        let _ = std::fs::remove_file(&path);
    }

    #[cfg(unix)]
    #[test]
    fn character_device_is_not_truncated() {
        let mut channel = SerialChannel::open("/dev/null", &SerialConfig::default()).unwrap();
        assert_eq!(channel.kind(), ChannelKind::File);
        channel.write_all(b"\x01\x01\x00").unwrap();
        channel.flush().unwrap();
    }

    #[test]
    fn default_config_matches_receiver() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.settle_delay, std::time::Duration::from_millis(200));
    }

    #[test]
    fn debug_output_names_kind() {
        let path = temp_path("debug");
        std::fs::write(&path, b"").unwrap();
        let channel = SerialChannel::open(&path, &SerialConfig::default()).unwrap();
        assert!(format!("{channel:?}").contains("\"file\""));
        let _ = std::fs::remove_file(&path);
    }
}
