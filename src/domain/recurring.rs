use serde::{Deserialize, Serialize};

use super::order::Candidate;

/// Recurring contract type a stored payment detail was created under.
/// Sweeps only ever disable one-click contracts.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum Contract {
    Oneclick,
}

/// Gateway environment the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Test,
    /// Live endpoints are addressed through a merchant specific URL prefix.
    Live { url_prefix: String },
}

impl Environment {
    pub fn base_url(&self) -> String {
        match self {
            Environment::Test => "https://pal-test.adyen.com".to_string(),
            Environment::Live { url_prefix } => {
                format!("https://{url_prefix}-pal-live.adyenpayments.com")
            }
        }
    }
}

/// Body of a disable call.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DisableRequest {
    pub merchant_account: String,
    pub shopper_reference: String,
    pub recurring_detail_reference: String,
    pub contract: Contract,
}

impl DisableRequest {
    /// Builds the request that disables the one-click contract behind `candidate`.
    pub fn one_click(merchant_account: &str, candidate: &Candidate) -> Self {
        Self {
            merchant_account: merchant_account.to_string(),
            shopper_reference: candidate.order_number.clone(),
            recurring_detail_reference: candidate.transaction_reference.clone(),
            contract: Contract::Oneclick,
        }
    }
}

/// Successful disable response, e.g. `{"response": "[detail-successfully-disabled]"}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DisableResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<serde_json::Value>,
}
