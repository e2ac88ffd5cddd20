use catlink_transport::Transport;
use serde::Serialize;

use crate::cmd::ProbeArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct ProbeOutput<'a> {
    port: &'a str,
    baud_rate: u32,
    reachable: bool,
}

pub fn run(args: ProbeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut transport = Transport::new(args.connection.transport_config(None));
    let reachable = transport.probe();
    let out = ProbeOutput {
        port: transport.path(),
        baud_rate: transport.baud_rate(),
        reachable,
    };

    match format {
        OutputFormat::Json => print_json(&out),
        _ => println!(
            "{} @ {} baud: {}",
            out.port,
            out.baud_rate,
            if reachable { "reachable" } else { "unreachable" }
        ),
    }

    Ok(if reachable { SUCCESS } else { HEALTH_CHECK_FAILED })
}
