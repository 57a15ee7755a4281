use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an order in the commerce system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order lifecycle state as reported by the commerce system.
///
/// Only `Completed` orders are considered by the sweep. The `wc-` prefixed
/// aliases accept raw post statuses exported from the shop database.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[serde(alias = "wc-pending")]
    Pending,
    #[serde(alias = "wc-processing")]
    Processing,
    #[serde(alias = "wc-on-hold")]
    OnHold,
    #[serde(alias = "wc-completed")]
    Completed,
    #[serde(alias = "wc-cancelled")]
    Cancelled,
    #[serde(alias = "wc-refunded")]
    Refunded,
    #[serde(alias = "wc-failed")]
    Failed,
}

/// An order record as held by the record store.
///
/// The sweep only ever writes the two `recurring_removal_*` fields; every
/// other field belongs to the commerce system.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    /// Gateway token of the stored payment method, if any.
    pub transaction_reference: Option<String>,
    /// Business facing order number, sent to the gateway as the shopper reference.
    pub order_number: String,
    #[serde(default)]
    pub recurring_removal_processed: bool,
    #[serde(default)]
    pub recurring_removal_status: Option<String>,
}

impl Order {
    pub fn new(
        id: u64,
        status: OrderStatus,
        transaction_reference: Option<String>,
        order_number: impl Into<String>,
    ) -> Self {
        Self {
            id: OrderId(id),
            status,
            transaction_reference,
            order_number: order_number.into(),
            recurring_removal_processed: false,
            recurring_removal_status: None,
        }
    }

    /// The transaction reference, treating blank values as absent.
    pub fn token(&self) -> Option<&str> {
        self.transaction_reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
    }

    /// Whether the store query should return this order at all.
    pub fn is_completed_with_token(&self) -> bool {
        self.status == OrderStatus::Completed && self.token().is_some()
    }

    /// Completed, carries a token and has not been processed yet.
    pub fn is_eligible(&self) -> bool {
        self.is_completed_with_token() && !self.recurring_removal_processed
    }

    /// Projects an eligible order into the tuple the executor works on.
    pub fn candidate(&self) -> Option<Candidate> {
        if !self.is_eligible() {
            return None;
        }
        self.token().map(|token| Candidate {
            id: self.id,
            order_number: self.order_number.clone(),
            transaction_reference: token.to_string(),
        })
    }

    /// Sets the processed flag and stores the outcome payload.
    pub fn mark_removal_processed(&mut self, status: String) {
        self.recurring_removal_processed = true;
        self.recurring_removal_status = Some(status);
    }

    /// Applies commerce-owned fields from `incoming` while keeping removal state.
    pub fn merge_commerce_fields(&mut self, incoming: Order) {
        self.status = incoming.status;
        self.transaction_reference = incoming.transaction_reference;
        self.order_number = incoming.order_number;
    }
}

/// An order selected for token removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: OrderId,
    pub order_number: String,
    pub transaction_reference: String,
}

/// What happened to a single candidate during a sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalOutcome {
    /// The gateway confirmed the contract was disabled; holds the serialized response.
    Disabled(String),
    /// The gateway call failed; holds the error description.
    Failed(String),
    /// The order was already marked processed when the executor reached it.
    Skipped,
}

impl RemovalOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RemovalOutcome::Disabled(_) => "disabled",
            RemovalOutcome::Failed(_) => "failed",
            RemovalOutcome::Skipped => "skipped",
        }
    }

    /// The payload persisted as `recurring_removal_status`.
    pub fn status(&self) -> Option<&str> {
        match self {
            RemovalOutcome::Disabled(status) | RemovalOutcome::Failed(status) => Some(status),
            RemovalOutcome::Skipped => None,
        }
    }
}

/// Per-order result streamed out of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderOutcome {
    pub order_id: OrderId,
    pub order_number: String,
    pub outcome: RemovalOutcome,
}
