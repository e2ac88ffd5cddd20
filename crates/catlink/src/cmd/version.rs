use catlink_frame::{Dialect, END_OF_FRAME, START_OF_FRAME};
use catlink_serial::{DEFAULT_BAUD_RATE, PREFERRED_PRODUCT_ID, PREFERRED_VENDOR_ID};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("catlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: catlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", target_triple());
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "markers: start={} end={}",
        String::from_utf8_lossy(&START_OF_FRAME),
        String::from_utf8_lossy(&END_OF_FRAME)
    );
    println!("default_dialect: {}", Dialect::default());
    println!("default_baud: {DEFAULT_BAUD_RATE}");
    println!("preferred_device: {PREFERRED_VENDOR_ID:04x}:{PREFERRED_PRODUCT_ID:04x}");

    Ok(SUCCESS)
}

fn target_triple() -> String {
    if let Some(target) = option_env!("CATLINK_BUILD_TARGET") {
        return target.to_string();
    }

    match (std::env::consts::ARCH, std::env::consts::OS) {
        ("aarch64", "macos") => "aarch64-apple-darwin".to_string(),
        ("x86_64", "macos") => "x86_64-apple-darwin".to_string(),
        ("aarch64", "linux") => "aarch64-unknown-linux-gnu".to_string(),
        ("x86_64", "linux") => "x86_64-unknown-linux-gnu".to_string(),
        ("x86_64", "windows") => "x86_64-pc-windows-msvc".to_string(),
        (arch, os) => format!("{arch}-unknown-{os}"),
    }
}
