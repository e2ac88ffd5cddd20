use std::fs;

use catlink_transport::Transport;
use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{io_error, transport_error, CliError, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let mut transport = Transport::new(args.connection.transport_config(None));

    transport
        .open()
        .map_err(|err| transport_error("open failed", err))?;
    transport
        .send(&payload)
        .map_err(|err| transport_error("send failed", err))?;
    info!(port = %transport.path(), bytes = payload.len(), "sent");
    transport.close();

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(text) = &args.hex_data {
        return decode_hex(text);
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::usage("one of --hex, --data or --file is required"))
}

/// Decode a hex payload, ignoring whitespace and an optional `0x` prefix.
fn decode_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).map_err(|err| CliError::usage(format!("--hex is not valid hex: {err}")))
}
