use super::executor::DisableExecutor;
use super::scanner::EligibilityScanner;
use super::throttle::BatchThrottler;
use crate::config::{SweeperConfig, ThrottleConfig};
use crate::domain::order::{OrderOutcome, RemovalOutcome};
use crate::domain::ports::{OrderStoreBox, RecurringGatewayBox, Throttle};
use crate::error::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Receives each order's outcome as soon as it has been persisted.
pub trait OutcomeSink {
    fn accept(&mut self, outcome: &OrderOutcome) -> Result<()>;
}

impl OutcomeSink for Vec<OrderOutcome> {
    fn accept(&mut self, outcome: &OrderOutcome) -> Result<()> {
        self.push(outcome.clone());
        Ok(())
    }
}

/// Sink for callers that only need the summary.
pub struct DiscardOutcomes;

impl OutcomeSink for DiscardOutcomes {
    fn accept(&mut self, _outcome: &OrderOutcome) -> Result<()> {
        Ok(())
    }
}

/// Counters from a single sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Completed orders with a token that the scanner examined.
    pub scanned: u64,
    pub eligible: u64,
    pub disabled: u64,
    pub failed: u64,
    /// Candidates found already processed when the executor reached them.
    pub skipped: u64,
    pub scan_cooldowns: u64,
    pub execution_cooldowns: u64,
    /// The sweep stopped early on cancellation. Remaining orders stay eligible.
    pub interrupted: bool,
}

impl SweepReport {
    /// Orders whose removal state was written during this sweep.
    pub fn processed(&self) -> u64 {
        self.disabled + self.failed
    }
}

/// Settings the sweep needs out of the process configuration.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub merchant_account: String,
    pub page_size: usize,
    pub throttle: ThrottleConfig,
}

impl SweepSettings {
    pub fn from_config(config: &SweeperConfig) -> Self {
        Self {
            merchant_account: config.gateway.merchant_account.clone(),
            page_size: config.scan.page_size,
            throttle: config.throttle.clone(),
        }
    }
}

/// Runs token removal sweeps over an order store.
///
/// A sweep scans eligible orders lazily and processes them strictly one at a
/// time, in scan order. Each order's outcome is committed before the next
/// candidate is fetched, so an interrupted sweep resumes cleanly on the next
/// run. Store failures abort the sweep.
///
/// Cancellation is only observed while scanning or cooling down. An order
/// whose gateway call has started is always recorded before the sweep stops.
pub struct Sweeper {
    store: OrderStoreBox,
    gateway: RecurringGatewayBox,
    throttle: Arc<dyn Throttle>,
    settings: SweepSettings,
}

impl Sweeper {
    pub fn new(
        store: OrderStoreBox,
        gateway: RecurringGatewayBox,
        throttle: Arc<dyn Throttle>,
        settings: SweepSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            throttle,
            settings,
        }
    }

    /// Runs one full sweep, streaming per-order outcomes into `sink`.
    pub async fn run_once(&self, sink: &mut dyn OutcomeSink) -> Result<SweepReport> {
        self.run_until(sink, &CancellationToken::new()).await
    }

    /// Like [`Sweeper::run_once`], stopping between orders once `cancel` fires.
    pub async fn run_until(
        &self,
        sink: &mut dyn OutcomeSink,
        cancel: &CancellationToken,
    ) -> Result<SweepReport> {
        self.sweep(sink, cancel)
            .instrument(tracing::info_span!("sweep"))
            .await
    }

    async fn sweep(
        &self,
        sink: &mut dyn OutcomeSink,
        cancel: &CancellationToken,
    ) -> Result<SweepReport> {
        tracing::info!(
            page_size = self.settings.page_size,
            batch_size = self.settings.throttle.batch_size,
            cooldown_secs = self.settings.throttle.cooldown_secs,
            "Starting sweep"
        );

        let mut scanner = EligibilityScanner::new(
            self.store.as_ref(),
            self.settings.page_size,
            BatchThrottler::from_config(&self.settings.throttle, self.throttle.clone()),
        );
        let mut execution =
            BatchThrottler::from_config(&self.settings.throttle, self.throttle.clone());
        let executor = DisableExecutor::new(
            self.store.as_ref(),
            self.gateway.as_ref(),
            &self.settings.merchant_account,
        );

        let mut report = SweepReport::default();

        loop {
            let candidate = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.interrupted = true;
                    break;
                }
                next = scanner.next_candidate() => match next? {
                    Some(candidate) => candidate,
                    None => break,
                },
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.interrupted = true;
                    break;
                }
                _ = execution.admit() => {}
            }

            // Not cancellable: the outcome must be recorded once the gateway is called
            let outcome = executor.execute(&candidate).await?;

            match outcome {
                RemovalOutcome::Disabled(_) => report.disabled += 1,
                RemovalOutcome::Failed(_) => report.failed += 1,
                RemovalOutcome::Skipped => report.skipped += 1,
            }

            sink.accept(&OrderOutcome {
                order_id: candidate.id,
                order_number: candidate.order_number,
                outcome,
            })?;
        }

        report.scanned = scanner.scanned();
        report.eligible = scanner.eligible();
        report.scan_cooldowns = scanner.cooldowns();
        report.execution_cooldowns = execution.cooldowns();

        tracing::info!(
            scanned = report.scanned,
            eligible = report.eligible,
            disabled = report.disabled,
            failed = report.failed,
            skipped = report.skipped,
            interrupted = report.interrupted,
            "Sweep complete"
        );

        Ok(report)
    }
}
