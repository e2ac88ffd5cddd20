use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use catlink_transport::{Transport, TransportError};
use tracing::{debug, info, warn};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS, TIMEOUT};
use crate::output::{print_frame, OutputFormat};

/// How long a single `recv` may block before the loop rechecks Ctrl-C and
/// the idle deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let idle_timeout = args.timeout.as_deref().map(parse_duration).transpose()?;
    let mut transport = Transport::new(args.connection.transport_config(Some(POLL_INTERVAL)));
    info!(port = %transport.path(), dialect = %transport.dialect(), "listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let result = receive_loop(&mut transport, &running, args.count, idle_timeout, format);
    transport.close();
    result
}

fn receive_loop(
    transport: &mut Transport,
    running: &AtomicBool,
    count: Option<usize>,
    idle_timeout: Option<Duration>,
    format: OutputFormat,
) -> CliResult<i32> {
    let markers = transport.frame_config().markers.clone();
    let port = transport.path().to_string();
    let mut printed = 0usize;
    let mut last_frame = Instant::now();

    while running.load(Ordering::SeqCst) {
        match transport.recv() {
            Ok(Some(frame)) => {
                last_frame = Instant::now();
                printed = printed.saturating_add(1);
                print_frame(&frame, printed, &markers, &port, format);

                if count.is_some_and(|count| printed >= count) {
                    return Ok(SUCCESS);
                }
            }
            Ok(None) => {
                warn!("consumed bytes without a frame boundary, skipping");
            }
            Err(TransportError::Timeout(_)) => {
                if let Some(limit) = idle_timeout {
                    if last_frame.elapsed() >= limit {
                        return Err(CliError::new(
                            TIMEOUT,
                            format!("no frame received within {limit:?}"),
                        ));
                    }
                }
            }
            Err(err) => return Err(transport_error("receive failed", err)),
        }
    }

    debug!(frames = printed, "interrupted");
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
