use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use catlink_frame::{Frame, Markers};
use catlink_serial::DeviceDescriptor;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    index: usize,
    size: usize,
    delimited: bool,
    frame: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
    port: &'a str,
    timestamp: String,
}

impl<'a> FrameOutput<'a> {
    fn new(frame: &Frame, index: usize, markers: &Markers, port: &'a str) -> Self {
        Self {
            index,
            size: frame.len(),
            delimited: frame.is_delimited(markers),
            frame: hex::encode(frame.as_bytes()),
            payload: frame.payload(markers).map(hex::encode),
            port,
            timestamp: now_unix_millis(),
        }
    }
}

/// Print one received frame. `index` counts from 1 within a listen session.
pub fn print_frame(
    frame: &Frame,
    index: usize,
    markers: &Markers,
    port: &str,
    format: OutputFormat,
) {
    let out = FrameOutput::new(frame, index, markers, port);
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "DELIMITED", "FRAME"])
                .add_row(vec![
                    out.index.to_string(),
                    out.size.to_string(),
                    out.delimited.to_string(),
                    out.frame.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{} size={} delimited={} {}",
                out.index, out.size, out.delimited, out.frame
            );
        }
        OutputFormat::Raw => print_raw(frame.as_bytes()),
    }
}

#[derive(Serialize)]
struct DeviceOutput<'a> {
    path: &'a str,
    vendor_id: u16,
    product_id: u16,
    preferred: bool,
}

/// Print discovered devices, flagging those matching the preferred ids.
pub fn print_devices(
    devices: &[DeviceDescriptor],
    vendor_id: u16,
    product_id: u16,
    format: OutputFormat,
) {
    let rows: Vec<DeviceOutput<'_>> = devices
        .iter()
        .map(|device| DeviceOutput {
            path: &device.path,
            vendor_id: device.vendor_id,
            product_id: device.product_id,
            preferred: device.matches(vendor_id, product_id),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PATH", "VID", "PID", "PREFERRED"]);
            for row in &rows {
                table.add_row(vec![
                    row.path.to_string(),
                    format!("{:04x}", row.vendor_id),
                    format!("{:04x}", row.product_id),
                    if row.preferred { "*" } else { "" }.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            if rows.is_empty() {
                println!("no USB serial devices found");
            }
            for row in &rows {
                println!(
                    "{}{} vid={:04x} pid={:04x}",
                    if row.preferred { "* " } else { "  " },
                    row.path,
                    row.vendor_id,
                    row.product_id
                );
            }
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_millis() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_output_encodes_frame_and_payload() {
        let markers = Markers::default();
        let frame = Frame::new(&b"@S\x01\xff@E"[..]);
        let out = FrameOutput::new(&frame, 3, &markers, "/dev/ttyACM0");

        assert_eq!(out.index, 3);
        assert_eq!(out.size, 6);
        assert!(out.delimited);
        assert_eq!(out.frame, "405301ff4045");
        assert_eq!(out.payload.as_deref(), Some("01ff"));
    }

    #[test]
    fn undelimited_frame_omits_payload_in_json() {
        let markers = Markers::default();
        let frame = Frame::new(&b"boot ok@E"[..]);
        let out = FrameOutput::new(&frame, 1, &markers, "COM3");
        let json = serde_json::to_value(&out).unwrap();

        assert_eq!(json["delimited"], false);
        assert!(json.get("payload").is_none());
        assert_eq!(json["port"], "COM3");
    }
}
