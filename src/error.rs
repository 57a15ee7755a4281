use crate::config::ConfigError;
use crate::domain::order::OrderId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
    #[error("Order {0} not found in store")]
    OrderNotFound(OrderId),
    #[error("Store error: {0}")]
    StoreError(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;

/// Failure of a single disable call against the payment gateway.
///
/// These never abort a sweep: the executor records the display text as the
/// order's removal status and moves on.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{error_code}: {message} (HTTP {status})")]
    Api {
        status: u16,
        error_code: String,
        message: String,
    },
    #[error("{0}")]
    Transport(String),
    #[error("Unexpected gateway response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Transport(format!("Request timed out: {err}"))
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = GatewayError::Api {
            status: 422,
            error_code: "800".to_string(),
            message: "Contract not found".to_string(),
        };
        assert_eq!(err.to_string(), "800: Contract not found (HTTP 422)");
    }

    #[test]
    fn test_order_not_found_display() {
        let err = SweepError::OrderNotFound(OrderId(42));
        assert_eq!(err.to_string(), "Order 42 not found in store");
    }
}
