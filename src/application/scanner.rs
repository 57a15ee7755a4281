use super::throttle::BatchThrottler;
use crate::domain::order::{Candidate, Order, OrderId};
use crate::domain::ports::OrderStore;
use crate::error::Result;
use std::collections::VecDeque;

/// Lazily walks the store's completed orders page by page and yields the
/// ones still eligible for token removal.
///
/// Only one page is held in memory at a time. Pages are keyed on the last
/// seen order id, so records marked processed while the scan is running do
/// not shift later pages. Only eligible records count toward the scan
/// throttle, so a history of processed orders never costs a cooldown.
pub struct EligibilityScanner<'a> {
    store: &'a dyn OrderStore,
    page_size: usize,
    throttler: BatchThrottler,
    page: VecDeque<Order>,
    cursor: Option<OrderId>,
    exhausted: bool,
    scanned: u64,
}

impl<'a> EligibilityScanner<'a> {
    pub fn new(store: &'a dyn OrderStore, page_size: usize, throttler: BatchThrottler) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            throttler,
            page: VecDeque::new(),
            cursor: None,
            exhausted: false,
            scanned: 0,
        }
    }

    /// Returns the next eligible candidate, or `None` once the store is exhausted.
    pub async fn next_candidate(&mut self) -> Result<Option<Candidate>> {
        loop {
            let Some(order) = self.next_order().await? else {
                return Ok(None);
            };

            self.scanned += 1;

            if let Some(candidate) = order.candidate() {
                self.throttler.admit().await;
                return Ok(Some(candidate));
            }

            tracing::trace!(order_id = %order.id, "Order not eligible, skipping");
        }
    }

    async fn next_order(&mut self) -> Result<Option<Order>> {
        if self.page.is_empty() && !self.exhausted {
            let page = self
                .store
                .completed_page(self.cursor, self.page_size)
                .await?;
            tracing::debug!(after = ?self.cursor, fetched = page.len(), "Fetched order page");

            if page.len() < self.page_size {
                self.exhausted = true;
            }
            if let Some(last) = page.last() {
                self.cursor = Some(last.id);
            }
            self.page.extend(page);
        }
        Ok(self.page.pop_front())
    }

    /// Completed orders with a token examined so far.
    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    pub fn eligible(&self) -> u64 {
        self.throttler.admitted()
    }

    pub fn cooldowns(&self) -> u64 {
        self.throttler.cooldowns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::infrastructure::in_memory::InMemoryOrderStore;
    use crate::infrastructure::throttle::NoopThrottle;
    use std::sync::Arc;
    use std::time::Duration;

    fn throttler() -> BatchThrottler {
        BatchThrottler::new(100, Duration::from_secs(120), Arc::new(NoopThrottle))
    }

    async fn collect(scanner: &mut EligibilityScanner<'_>) -> Vec<Candidate> {
        let mut out = Vec::new();
        while let Some(candidate) = scanner.next_candidate().await.unwrap() {
            out.push(candidate);
        }
        out
    }

    #[tokio::test]
    async fn test_empty_store_yields_nothing() {
        let store = InMemoryOrderStore::new();
        let mut scanner = EligibilityScanner::new(&store, 10, throttler());

        assert!(scanner.next_candidate().await.unwrap().is_none());
        assert_eq!(scanner.scanned(), 0);
        assert_eq!(scanner.eligible(), 0);
    }

    #[tokio::test]
    async fn test_filters_and_preserves_order_across_pages() {
        let store = InMemoryOrderStore::new();
        for id in 1..=25u64 {
            let status = if id % 5 == 0 {
                OrderStatus::Refunded
            } else {
                OrderStatus::Completed
            };
            let reference = (id % 7 != 0).then(|| format!("ref-{id}"));
            store
                .upsert_order(Order::new(id, status, reference, format!("SO-{id}")))
                .await
                .unwrap();
        }
        store
            .mark_removal_processed(OrderId(1), "done".to_string())
            .await
            .unwrap();

        let mut scanner = EligibilityScanner::new(&store, 4, throttler());
        let ids: Vec<u64> = collect(&mut scanner).await.iter().map(|c| c.id.0).collect();

        let expected: Vec<u64> = (2..=25u64)
            .filter(|id| id % 5 != 0 && id % 7 != 0)
            .collect();
        assert_eq!(ids, expected);
        assert_eq!(scanner.eligible(), expected.len() as u64);
        // Processed order 1 is still examined, ineligible ones are not returned by the store
        assert_eq!(scanner.scanned(), expected.len() as u64 + 1);
    }

    #[tokio::test]
    async fn test_marking_during_scan_does_not_skip_records() {
        let store = InMemoryOrderStore::new();
        for id in 1..=9u64 {
            store
                .upsert_order(Order::new(
                    id,
                    OrderStatus::Completed,
                    Some(format!("ref-{id}")),
                    format!("SO-{id}"),
                ))
                .await
                .unwrap();
        }

        let mut scanner = EligibilityScanner::new(&store, 2, throttler());
        let mut seen = Vec::new();
        while let Some(candidate) = scanner.next_candidate().await.unwrap() {
            store
                .mark_removal_processed(candidate.id, "ok".to_string())
                .await
                .unwrap();
            seen.push(candidate.id.0);
        }
        assert_eq!(seen, (1..=9).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_processed_history_costs_no_cooldown() {
        let store = InMemoryOrderStore::new();
        for id in 1..=250u64 {
            store
                .upsert_order(Order::new(
                    id,
                    OrderStatus::Completed,
                    Some(format!("ref-{id}")),
                    format!("SO-{id}"),
                ))
                .await
                .unwrap();
            store
                .mark_removal_processed(OrderId(id), "done".to_string())
                .await
                .unwrap();
        }

        let mut scanner = EligibilityScanner::new(&store, 100, throttler());

        assert!(collect(&mut scanner).await.is_empty());
        assert_eq!(scanner.scanned(), 250);
        assert_eq!(scanner.eligible(), 0);
        assert_eq!(scanner.cooldowns(), 0);
    }
}
