//! netspeed - live network throughput display.
//!
//! Polls the kernel once per second for host-wide link statistics and
//! prints the download/upload rate since the previous poll:
//!
//! ```text
//! D:1.5 KiB/s | U:200.0 B/s
//! ```
//!
//! On an interactive terminal the line is redrawn in place; when stdout
//! is redirected, one newline-terminated line is emitted per second.
//! Takes no arguments and runs until killed; diagnostics go to stderr
//! (tune with RUST_LOG).

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::QueueableCommand;
use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use netspeed::collector::LinkStatsSample;
use netspeed::rates::{DeltaTracker, format_rate_line, scale};

/// Fixed poll cadence.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Initializes the tracing subscriber on stderr.
///
/// Default level is WARN so the display line owns stdout and only
/// transport problems show up. File and line numbers are included so
/// warnings carry their origin.
fn init_logging() {
    let filter = EnvFilter::from_default_env().add_directive("netspeed=warn".parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}

#[cfg(target_os = "linux")]
fn take_sample() -> LinkStatsSample {
    netspeed::collector::collect()
}

/// Only Linux exposes link statistics over rtnetlink.
#[cfg(not(target_os = "linux"))]
fn take_sample() -> LinkStatsSample {
    LinkStatsSample::default()
}

/// Writes one rate line and flushes.
///
/// Interactive terminals get a carriage return and a clear-to-end-of-line
/// before the redraw, producing a single live-updating line; pipes and
/// files get plain newline-terminated lines.
fn emit(stdout: &mut io::Stdout, line: &str, interactive: bool) -> io::Result<()> {
    if interactive {
        stdout.queue(MoveToColumn(0))?;
        stdout.queue(Clear(ClearType::UntilNewLine))?;
        stdout.write_all(line.as_bytes())?;
    } else {
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")?;
    }
    stdout.flush()
}

fn main() {
    init_logging();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("failed to install SIGINT handler: {}", e);
        }
    }

    let mut stdout = io::stdout();
    let interactive = stdout.is_tty();
    let mut tracker = DeltaTracker::new(take_sample());

    while running.load(Ordering::SeqCst) {
        thread::sleep(POLL_INTERVAL);

        let (rx_delta, tx_delta) = tracker.advance(take_sample());
        let line = format_rate_line(scale(rx_delta), scale(tx_delta));
        if let Err(e) = emit(&mut stdout, &line, interactive) {
            warn!("stdout write failed: {}", e);
        }
    }

    // Unglue the shell prompt from the live line.
    if interactive {
        let _ = stdout.write_all(b"\n");
        let _ = stdout.flush();
    }
}
