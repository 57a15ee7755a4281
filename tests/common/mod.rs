// Shared by several test binaries; not every helper is used by each of them.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use token_sweeper::application::sweep::{SweepSettings, Sweeper};
use token_sweeper::config::ThrottleConfig;
use token_sweeper::domain::order::{Order, OrderId, OrderStatus};
use token_sweeper::domain::ports::{OrderStore, RecurringGateway, Throttle};
use token_sweeper::domain::recurring::{DisableRequest, DisableResponse};
use token_sweeper::error::{GatewayError, Result};
use token_sweeper::infrastructure::in_memory::InMemoryOrderStore;

/// Writes an orders CSV with `rows` completed orders carrying a token.
pub fn generate_orders_csv(path: &Path, rows: usize) -> std::result::Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["id", "status", "transaction_reference", "order_number"])?;

    for i in 1..=rows {
        wtr.write_record([
            i.to_string(),
            "completed".to_string(),
            format!("84156984625{i:05}"),
            format!("SO-{i}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn completed_order(id: u64) -> Order {
    Order::new(
        id,
        OrderStatus::Completed,
        Some(format!("ref-{id}")),
        format!("SO-{id}"),
    )
}

pub async fn seed_completed(store: &dyn OrderStore, count: u64) {
    for id in 1..=count {
        store.upsert_order(completed_order(id)).await.unwrap();
    }
}

/// Things that happened during a sweep, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Disable(String),
    Pause(Duration),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Gateway double that succeeds unless a failure was scripted for the reference.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    failures: Arc<HashMap<String, String>>,
    requests: Arc<Mutex<Vec<DisableRequest>>>,
    log: EventLog,
}

impl ScriptedGateway {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn failing(mut self, reference: &str, message: &str) -> Self {
        Arc::make_mut(&mut self.failures).insert(reference.to_string(), message.to_string());
        self
    }

    pub fn requests(&self) -> Vec<DisableRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl RecurringGateway for ScriptedGateway {
    async fn disable(
        &self,
        request: &DisableRequest,
    ) -> std::result::Result<DisableResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.log
            .lock()
            .unwrap()
            .push(Event::Disable(request.recurring_detail_reference.clone()));

        match self.failures.get(&request.recurring_detail_reference) {
            Some(message) => Err(GatewayError::Transport(message.clone())),
            None => Ok(DisableResponse {
                response: "[detail-successfully-disabled]".to_string(),
                details: Vec::new(),
            }),
        }
    }
}

/// Throttle double that logs instead of sleeping.
#[derive(Clone, Default)]
pub struct RecordingThrottle {
    log: EventLog,
}

impl RecordingThrottle {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Throttle for RecordingThrottle {
    async fn pause(&self, duration: Duration) {
        self.log.lock().unwrap().push(Event::Pause(duration));
    }
}

/// Delegating store that counts writes of removal state.
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: InMemoryOrderStore,
    marks: Arc<AtomicUsize>,
    fail_marks: bool,
}

impl CountingStore {
    pub fn new(inner: InMemoryOrderStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    /// Every write of removal state fails.
    pub fn broken(inner: InMemoryOrderStore) -> Self {
        Self {
            inner,
            fail_marks: true,
            ..Default::default()
        }
    }

    pub fn marks(&self) -> usize {
        self.marks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for CountingStore {
    async fn upsert_order(&self, order: Order) -> Result<()> {
        self.inner.upsert_order(order).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        self.inner.get(id).await
    }

    async fn completed_page(&self, after: Option<OrderId>, limit: usize) -> Result<Vec<Order>> {
        self.inner.completed_page(after, limit).await
    }

    async fn is_removal_processed(&self, id: OrderId) -> Result<bool> {
        self.inner.is_removal_processed(id).await
    }

    async fn mark_removal_processed(&self, id: OrderId, status: String) -> Result<()> {
        if self.fail_marks {
            return Err(token_sweeper::error::SweepError::StoreError(
                "disk full".to_string(),
            ));
        }
        self.marks.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_removal_processed(id, status).await
    }
}

pub fn settings() -> SweepSettings {
    SweepSettings {
        merchant_account: "ShopECOM".to_string(),
        page_size: 100,
        throttle: ThrottleConfig::default(),
    }
}

pub fn sweeper(store: CountingStore, gateway: ScriptedGateway, throttle: RecordingThrottle) -> Sweeper {
    Sweeper::new(Box::new(store), Box::new(gateway), Arc::new(throttle), settings())
}

/// Writes a config pointing the gateway at `endpoint`, with cooldowns disabled.
pub fn write_config(dir: &Path, endpoint: &str) -> std::path::PathBuf {
    let path = dir.join("token-sweeper.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[gateway]
api_key = "AQE-test"
merchant_account = "ShopECOM"
endpoint = "{endpoint}"
timeout_secs = 5

[throttle]
cooldown_secs = 0

[logging]
filter = "info"
"#
        ),
    )
    .unwrap();
    path
}
