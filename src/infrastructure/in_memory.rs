use crate::domain::order::{Order, OrderId};
use crate::domain::ports::OrderStore;
use crate::error::{Result, SweepError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order store.
///
/// Orders are kept in a `BTreeMap` so pages come back in id order.
/// Ideal for testing or one-off sweeps over an imported CSV.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<BTreeMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn upsert_order(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id) {
            Some(existing) => existing.merge_commerce_fields(order),
            None => {
                orders.insert(order.id, order);
            }
        }
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn completed_page(&self, after: Option<OrderId>, limit: usize) -> Result<Vec<Order>> {
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        let orders = self.orders.read().await;
        Ok(orders
            .range((lower, Bound::Unbounded))
            .map(|(_, order)| order)
            .filter(|order| order.is_completed_with_token())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn is_removal_processed(&self, id: OrderId) -> Result<bool> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(&id)
            .is_some_and(|order| order.recurring_removal_processed))
    }

    async fn mark_removal_processed(&self, id: OrderId, status: String) -> Result<()> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(SweepError::OrderNotFound(id))?;
        order.mark_removal_processed(status);
        Ok(())
    }
}
