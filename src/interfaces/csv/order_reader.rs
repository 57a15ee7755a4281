use crate::domain::order::{Order, OrderStatus};
use crate::error::{Result, SweepError};
use serde::Deserialize;
use std::io::Read;

/// One row of an order export: `id,status,transaction_reference,order_number`.
#[derive(Debug, Deserialize)]
struct OrderRow {
    id: u64,
    status: OrderStatus,
    transaction_reference: Option<String>,
    order_number: String,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order::new(row.id, row.status, row.transaction_reference, row.order_number)
    }
}

/// Reads orders from a CSV export of the commerce system.
///
/// Whitespace is trimmed and an empty `transaction_reference` reads as absent.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    /// Creates a new `OrderReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes orders, one row at a time.
    pub fn orders(self) -> impl Iterator<Item = Result<Order>> {
        self.reader
            .into_deserialize::<OrderRow>()
            .map(|result| result.map(Order::from).map_err(SweepError::from))
    }
}
