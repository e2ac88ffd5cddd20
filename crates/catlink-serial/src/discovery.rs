use serialport::SerialPortType;
use tracing::{debug, warn};

/// Identity of an attached USB serial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: String,
}

impl DeviceDescriptor {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            path: path.into(),
        }
    }

    /// Whether this device carries exactly the given vendor/product pair.
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

/// Enumerate the USB serial devices currently attached.
///
/// Discovery is advisory: if the OS cannot be queried the failure is logged
/// and an empty list is returned. Ports without USB identity (built-in
/// UARTs, Bluetooth, PCI) are skipped.
pub fn discover() -> Vec<DeviceDescriptor> {
    let ports = match serialport::available_ports() {
        Ok(ports) => ports,
        Err(err) => {
            warn!(error = %err, "serial device enumeration failed");
            return Vec::new();
        }
    };

    ports
        .into_iter()
        .filter_map(|port| match port.port_type {
            SerialPortType::UsbPort(info) => Some(DeviceDescriptor {
                vendor_id: info.vid,
                product_id: info.pid,
                path: port.port_name,
            }),
            _ => None,
        })
        .collect()
}

/// Path of the first attached device matching `(vendor_id, product_id)`,
/// or `fallback_path` when none does.
pub fn locate_preferred(vendor_id: u16, product_id: u16, fallback_path: &str) -> String {
    locate_preferred_in(discover(), vendor_id, product_id, fallback_path)
}

/// Same as [`locate_preferred`] over an explicit device sequence. The first
/// match in sequence order wins.
pub fn locate_preferred_in(
    devices: impl IntoIterator<Item = DeviceDescriptor>,
    vendor_id: u16,
    product_id: u16,
    fallback_path: &str,
) -> String {
    match devices
        .into_iter()
        .find(|device| device.matches(vendor_id, product_id))
    {
        Some(device) => {
            debug!(path = %device.path, vendor_id, product_id, "preferred device found");
            device.path
        }
        None => {
            debug!(path = fallback_path, vendor_id, product_id, "no preferred device, using fallback");
            fallback_path.to_string()
        }
    }
}
