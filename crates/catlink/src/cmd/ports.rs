use catlink_serial::{discover, DeviceDefaults};
use tracing::debug;

use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_devices, OutputFormat};

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let defaults = DeviceDefaults::default();
    let devices = discover();
    debug!(count = devices.len(), "serial devices discovered");

    print_devices(&devices, defaults.vendor_id, defaults.product_id, format);
    Ok(SUCCESS)
}
