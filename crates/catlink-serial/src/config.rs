use std::time::Duration;

/// Default line rate of the sniffer firmware.
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// USB vendor id of the preferred sniffer board.
pub const PREFERRED_VENDOR_ID: u16 = 11914;

/// USB product id of the preferred sniffer board.
pub const PREFERRED_PRODUCT_ID: u16 = 192;

#[cfg(target_os = "windows")]
const FALLBACK_PATH: &str = "COM1";
#[cfg(target_os = "macos")]
const FALLBACK_PATH: &str = "/dev/tty.usbmodem0001";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const FALLBACK_PATH: &str = "/dev/ttyACM0";

/// Platform defaults used to resolve an endpoint when the caller gives none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDefaults {
    /// Path used when no attached device matches the preferred ids.
    pub fallback_path: String,
    /// Baud rate for newly created endpoints.
    pub baud_rate: u32,
    /// Preferred USB vendor id.
    pub vendor_id: u16,
    /// Preferred USB product id.
    pub product_id: u16,
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            fallback_path: FALLBACK_PATH.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            vendor_id: PREFERRED_VENDOR_ID,
            product_id: PREFERRED_PRODUCT_ID,
        }
    }
}

impl DeviceDefaults {
    /// Resolve the preferred device path among the currently attached ports.
    pub fn locate(&self) -> String {
        crate::discovery::locate_preferred(self.vendor_id, self.product_id, &self.fallback_path)
    }

    /// Endpoint configuration for `path` at the default baud rate.
    pub fn serial_config(&self, path: impl Into<String>) -> SerialConfig {
        SerialConfig {
            path: path.into(),
            baud_rate: self.baud_rate,
            read_timeout: None,
        }
    }
}

/// Endpoint configuration: which port, how fast, how long a read may wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Platform device identifier (`/dev/ttyACM0`, `COM3`, ...).
    pub path: String,
    /// Line rate in bits per second.
    pub baud_rate: u32,
    /// Upper bound on a single blocking read. `None` blocks until data
    /// arrives or the link fails.
    pub read_timeout: Option<Duration>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        DeviceDefaults::default().serial_config(FALLBACK_PATH)
    }
}
