use super::sweep::{DiscardOutcomes, Sweeper};
use crate::config::ScheduleConfig;
use tokio_util::sync::CancellationToken;

/// Runs a sweep, then waits the configured interval, until `cancel` fires.
///
/// Sweeps run back to back in this one task, so two sweeps never overlap
/// within the process. A failed sweep is logged and retried on the next tick;
/// orders it already marked stay marked. Cancellation during a sweep lets the
/// order in flight finish recording before the loop stops.
///
/// Returns the number of sweeps that ran.
pub async fn run_scheduled(
    sweeper: &Sweeper,
    schedule: &ScheduleConfig,
    cancel: &CancellationToken,
) -> u64 {
    tracing::info!(
        interval_secs = schedule.interval_secs,
        label = %schedule.label,
        "Starting scheduled sweeps"
    );

    let interval = schedule.interval();
    let mut sink = DiscardOutcomes;
    let mut runs = 0;

    while !cancel.is_cancelled() {
        runs += 1;
        match sweeper.run_until(&mut sink, cancel).await {
            Ok(report) if report.interrupted => {
                tracing::info!(
                    run = runs,
                    processed = report.processed(),
                    "Scheduled sweep interrupted"
                );
                break;
            }
            Ok(report) => tracing::info!(
                run = runs,
                processed = report.processed(),
                failed = report.failed,
                "Scheduled sweep finished"
            ),
            Err(e) => tracing::error!(run = runs, error = %e, "Scheduled sweep aborted"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!(runs, "Scheduler stopped");
    runs
}
