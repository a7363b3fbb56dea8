use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info};

use crate::engine::ReminderDispatcher;

/// Seconds until the next multiple of `interval_secs` since the epoch.
pub fn start_delay(now_secs: u64, interval_secs: u64) -> u64 {
    if interval_secs == 0 {
        return 0;
    }
    match now_secs % interval_secs {
        0 => 0,
        elapsed => interval_secs - elapsed,
    }
}

/// Runs a dispatch cycle on every interval boundary until `shutdown`
/// resolves. A slow cycle makes the loop skip ticks rather than stack them.
pub async fn run_scheduler<F>(dispatcher: Arc<ReminderDispatcher>, period: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let now_secs = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    let delay = Duration::from_secs(start_delay(now_secs, period.as_secs()));
    info!(delay_secs = delay.as_secs(), period_secs = period.as_secs(), "Reminder scheduler started");

    run_scheduler_at(dispatcher, Instant::now() + delay, period, shutdown).await;
}

/// Like [`run_scheduler`], with the first cycle at `start`.
pub async fn run_scheduler_at<F>(dispatcher: Arc<ReminderDispatcher>, start: Instant, period: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut ticks = interval_at(start, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Reminder scheduler stopping");
                break;
            }
            _ = ticks.tick() => {
                if let Err(e) = dispatcher.run_cycle().await {
                    error!(error = ?e, "Dispatch cycle aborted");
                }
            }
        }
    }
}
