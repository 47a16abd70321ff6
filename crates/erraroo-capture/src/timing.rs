//! Delayed page-timing report

use std::{sync::Arc, time::Duration};

use erraroo_core::ports::{ReportKind, TimingSource};
use erraroo_telemetry::ReportingClient;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

/// Delay between initialization and the timing report
pub const TIMING_DELAY: Duration = Duration::from_millis(5000);

/// Sends one `js.timing` report after `delay`.
///
/// Timing data is read when the delay elapses, not when scheduled. The
/// report is sent at most once and the task is never cancelled by the
/// reporter. Returns `None` outside a tokio runtime.
pub fn schedule_timing_report(
    client: ReportingClient,
    source: Arc<dyn TimingSource>,
    delay: Duration,
) -> Option<JoinHandle<()>> {
    let Ok(runtime) = Handle::try_current() else {
        warn!("No async runtime available, timing report skipped");
        return None;
    };

    debug!(delay_ms = delay.as_millis() as u64, "Timing report scheduled");

    Some(runtime.spawn(async move {
        tokio::time::sleep(delay).await;
        let times = source.get_times();
        if let Some(delivery) = client.send(ReportKind::Timing, times) {
            settle(delivery).await;
        }
    }))
}

/// Waits for a delivery task. Returns `false` if it panicked or was
/// cancelled.
async fn settle(delivery: JoinHandle<()>) -> bool {
    match delivery.await {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "Timing report task failed");
            false
        }
    }
}
