use std::path::PathBuf;
use std::time::Duration;

use catlink_frame::{Dialect, FrameConfig};
use catlink_serial::{DeviceDefaults, DEFAULT_BAUD_RATE};
use catlink_transport::TransportConfig;
use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{CliError, CliResult};
use crate::output::OutputFormat;

pub mod listen;
pub mod ports;
pub mod probe;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List attached USB serial devices.
    Ports,
    /// Check whether the serial port can be opened.
    Probe(ProbeArgs),
    /// Receive and print frames.
    Listen(ListenArgs),
    /// Write raw bytes to the serial port.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports => ports::run(format),
        Command::Probe(args) => probe::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// `END ++ START` boundary framing.
    Extended,
    /// END-terminated framing with CR/LF stripped.
    Generic,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Extended => Dialect::Extended,
            DialectArg::Generic => Dialect::Generic,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Serial port path. Default: the first attached sniffer board, else the
    /// platform fallback.
    #[arg(long, short = 'p', env = "CATLINK_PORT")]
    pub port: Option<String>,
    /// Baud rate.
    #[arg(long, short = 'b', env = "CATLINK_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Frame dialect spoken by the firmware.
    #[arg(long, env = "CATLINK_DIALECT", value_enum, default_value_t = DialectArg::Generic)]
    pub dialect: DialectArg,
}

impl ConnectionArgs {
    pub fn resolve_port(&self) -> String {
        match &self.port {
            Some(port) => port.clone(),
            None => DeviceDefaults::default().locate(),
        }
    }

    pub fn transport_config(&self, read_timeout: Option<Duration>) -> TransportConfig {
        let mut serial = DeviceDefaults::default().serial_config(self.resolve_port());
        serial.baud_rate = self.baud;
        serial.read_timeout = read_timeout;
        TransportConfig {
            serial,
            frame: FrameConfig::new(self.dialect.into()),
        }
    }
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Exit after receiving N frames.
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
    /// Give up when no frame completes within this time (e.g. 5s, 500ms).
    #[arg(long)]
    pub timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Hex-encoded payload.
    #[arg(long = "hex", conflicts_with_all = ["data", "file"], required_unless_present_any = ["data", "file"])]
    pub hex_data: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex_data", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["hex_data", "data"])]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
