use std::time::Duration;

/// Line speed used by the device-side receiver.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Pause after opening a terminal so the device can settle (USB CDC resets).
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Line settings applied when a channel is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate for terminal devices. Ignored for plain files.
    pub baud_rate: u32,
    /// Delay after configuring a terminal before the first write.
    pub settle_delay: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}
