use crate::domain::order::{Candidate, RemovalOutcome};
use crate::domain::ports::{OrderStore, RecurringGateway};
use crate::domain::recurring::DisableRequest;
use crate::error::Result;

/// Disables the stored contract behind a candidate and records the outcome.
///
/// The processed flag is written whether the gateway call succeeds or not, so
/// an order is attempted at most once. Only store failures are returned as
/// errors; gateway failures become a `Failed` outcome.
pub struct DisableExecutor<'a> {
    store: &'a dyn OrderStore,
    gateway: &'a dyn RecurringGateway,
    merchant_account: &'a str,
}

impl<'a> DisableExecutor<'a> {
    pub fn new(
        store: &'a dyn OrderStore,
        gateway: &'a dyn RecurringGateway,
        merchant_account: &'a str,
    ) -> Self {
        Self {
            store,
            gateway,
            merchant_account,
        }
    }

    pub async fn execute(&self, candidate: &Candidate) -> Result<RemovalOutcome> {
        // Another run may have got here first
        if self.store.is_removal_processed(candidate.id).await? {
            tracing::debug!(order_id = %candidate.id, "Already processed, skipping");
            return Ok(RemovalOutcome::Skipped);
        }

        let request = DisableRequest::one_click(self.merchant_account, candidate);
        let outcome = match self.gateway.disable(&request).await {
            Ok(response) => {
                tracing::debug!(
                    order_id = %candidate.id,
                    response = %response.response,
                    "Recurring contract disabled"
                );
                RemovalOutcome::Disabled(serde_json::to_string(&response)?)
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %candidate.id,
                    order_number = %candidate.order_number,
                    error = %e,
                    "Failed to disable recurring contract"
                );
                RemovalOutcome::Failed(e.to_string())
            }
        };

        if let Some(status) = outcome.status() {
            self.store
                .mark_removal_processed(candidate.id, status.to_string())
                .await?;
        }

        Ok(outcome)
    }
}
