use crate::domain::order::{Order, OrderId};
use crate::domain::ports::OrderStore;
use crate::error::{Result, SweepError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing order records.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store implementation using RocksDB.
///
/// Orders are keyed by their big-endian id, so iteration order matches id
/// order and pagination can seek straight past the cursor. Values are JSON.
///
/// RocksDB holds an exclusive lock on the database directory, which also keeps
/// a second sweeper process from opening the same store.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBOrderStore {
    db: Arc<DB>,
}

impl RocksDBOrderStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "orders" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn orders_cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_ORDERS)
            .ok_or_else(|| SweepError::StoreError("Orders column family not found".to_string()))
    }

    fn read(&self, id: OrderId) -> Result<Option<Order>> {
        let cf = self.orders_cf()?;
        match self.db.get_cf(cf, id.0.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, order: &Order) -> Result<()> {
        let cf = self.orders_cf()?;
        let value = serde_json::to_vec(order)?;
        self.db.put_cf(cf, order.id.0.to_be_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for RocksDBOrderStore {
    async fn upsert_order(&self, order: Order) -> Result<()> {
        let merged = match self.read(order.id)? {
            Some(mut existing) => {
                existing.merge_commerce_fields(order);
                existing
            }
            None => order,
        };
        self.write(&merged)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        self.read(id)
    }

    async fn completed_page(&self, after: Option<OrderId>, limit: usize) -> Result<Vec<Order>> {
        let cf = self.orders_cf()?;
        let start = match after {
            Some(id) => match id.0.checked_add(1) {
                Some(next) => next.to_be_bytes(),
                None => return Ok(Vec::new()),
            },
            None => 0u64.to_be_bytes(),
        };

        let mut page = Vec::with_capacity(limit);
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&start, Direction::Forward));

        for item in iter {
            if page.len() >= limit {
                break;
            }
            let (_key, value) = item?;
            let order: Order = serde_json::from_slice(&value)?;
            if order.is_completed_with_token() {
                page.push(order);
            }
        }

        Ok(page)
    }

    async fn is_removal_processed(&self, id: OrderId) -> Result<bool> {
        Ok(self
            .read(id)?
            .is_some_and(|order| order.recurring_removal_processed))
    }

    async fn mark_removal_processed(&self, id: OrderId, status: String) -> Result<()> {
        let mut order = self.read(id)?.ok_or(SweepError::OrderNotFound(id))?;
        order.mark_removal_processed(status);
        self.write(&order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use tempfile::tempdir;

    fn completed(id: u64) -> Order {
        Order::new(
            id,
            OrderStatus::Completed,
            Some(format!("ref-{id}")),
            format!("SO-{id}"),
        )
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBOrderStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_ORDERS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_order_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBOrderStore::open(dir.path()).unwrap();

        store.upsert_order(completed(1)).await.unwrap();
        assert_eq!(store.get(OrderId(1)).await.unwrap().unwrap(), completed(1));
        assert!(store.get(OrderId(2)).await.unwrap().is_none());

        store
            .mark_removal_processed(OrderId(1), "ok".to_string())
            .await
            .unwrap();
        assert!(store.is_removal_processed(OrderId(1)).await.unwrap());

        store.upsert_order(completed(1)).await.unwrap();
        assert!(store.is_removal_processed(OrderId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_rocksdb_pages_in_id_order() {
        let dir = tempdir().unwrap();
        let store = RocksDBOrderStore::open(dir.path()).unwrap();

        // Ids straddling a byte boundary check the big-endian key ordering
        for id in [300u64, 2, 256, 1, 255] {
            store.upsert_order(completed(id)).await.unwrap();
        }
        store
            .upsert_order(Order::new(3, OrderStatus::Cancelled, Some("x".into()), "SO-3"))
            .await
            .unwrap();

        let first = store.completed_page(None, 3).await.unwrap();
        assert_eq!(first.iter().map(|o| o.id.0).collect::<Vec<_>>(), vec![1, 2, 255]);

        let second = store.completed_page(Some(OrderId(255)), 3).await.unwrap();
        assert_eq!(second.iter().map(|o| o.id.0).collect::<Vec<_>>(), vec![256, 300]);
    }
}
