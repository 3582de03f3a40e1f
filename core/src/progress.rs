//! C7: the progress observer, spec §4.6.
//!
//! Samples the shared counters once per `output_every` and renders a 70-cell
//! bar, percent, downloaded/queued GiB, recent throughput in Gibit/s, and
//! object counts on a single carriage-return-refreshed line — the same
//! redraw technique as the teacher's `run_spinner`, generalized from a
//! spinner frame to a progress bar.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::counters::Counters;
use crate::logging::Logger;

const BAR_WIDTH: usize = 70;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn render_line(counters: &Counters, prev_bytes_downloaded: u64, interval: Duration) -> String {
    let bytes_queued = counters.bytes_queued();
    let bytes_downloaded = counters.bytes_downloaded();
    let objects_queued = counters.objects_queued();
    let objects_downloaded = counters.objects_downloaded();

    let percent = if bytes_queued > 0 {
        (bytes_downloaded as f64 / bytes_queued as f64) * 100.0
    } else {
        0.0
    };

    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    let bar: String = std::iter::repeat('=')
        .take(filled)
        .chain(std::iter::repeat(' ').take(BAR_WIDTH - filled))
        .collect();

    let delta_bytes = bytes_downloaded.saturating_sub(prev_bytes_downloaded);
    let gibit_per_sec = (delta_bytes as f64 * 8.0) / GIB / interval.as_secs_f64().max(f64::EPSILON);

    format!(
        "[{bar}] {percent:5.1}% {downloaded_gib:.2}/{queued_gib:.2} GiB {gibit_per_sec:.2} Gibit/s objects {objects_downloaded}/{objects_queued}\r",
        downloaded_gib = bytes_downloaded as f64 / GIB,
        queued_gib = bytes_queued as f64 / GIB,
    )
}

/// Runs until `stop` is signaled. `stop` carries `true` once the
/// orchestrator reaches quiescence; the observer renders one final sample
/// before returning so the last line reflects the completed run.
///
/// Per spec §6, the progress line is stdout — errors and list failures are
/// the only things that go to stderr (the `Logger`), so the refresh here
/// uses `print!`/`stdout().flush()` rather than the logger.
pub async fn run(counters: Arc<Counters>, logger: Arc<Logger>, output_every: Duration, mut stop: watch::Receiver<bool>) {
    use std::io::Write;

    logger.set_progress_active(true);
    let mut prev_bytes_downloaded = 0u64;

    loop {
        print!("{}", render_line(&counters, prev_bytes_downloaded, output_every));
        let _ = std::io::stdout().flush();
        prev_bytes_downloaded = counters.bytes_downloaded();

        if *stop.borrow() {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(output_every) => {}
            _ = stop.changed() => {}
        }
    }

    println!();
    logger.set_progress_active(false);
}
