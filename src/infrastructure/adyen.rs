use crate::config::{ApiKey, GatewayConfig};
use crate::domain::ports::RecurringGateway;
use crate::domain::recurring::{DisableRequest, DisableResponse};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Error body returned by the gateway on non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceError {
    status: Option<u16>,
    error_code: String,
    message: String,
}

/// Client for the Adyen Recurring API `disable` endpoint.
#[derive(Clone)]
pub struct AdyenRecurringClient {
    http: Client,
    disable_url: String,
    api_key: ApiKey,
}

impl AdyenRecurringClient {
    /// Builds a client for the configured environment.
    ///
    /// `gateway.endpoint`, when set, replaces the environment's base URL.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let base_url = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => config.environment()?.base_url(),
        };

        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            disable_url: format!(
                "{}/pal/servlet/Recurring/{}/disable",
                base_url.trim_end_matches('/'),
                config.api_version
            ),
            api_key: config.api_key.clone(),
        })
    }

    pub fn disable_url(&self) -> &str {
        &self.disable_url
    }
}

#[async_trait]
impl RecurringGateway for AdyenRecurringClient {
    async fn disable(
        &self,
        request: &DisableRequest,
    ) -> std::result::Result<DisableResponse, GatewayError> {
        let response = self
            .http
            .post(&self.disable_url)
            .header("X-API-Key", self.api_key.expose())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ServiceError>(&body) {
                Ok(error) => GatewayError::Api {
                    status: error.status.unwrap_or(status.as_u16()),
                    error_code: error.error_code,
                    message: error.message,
                },
                Err(_) => GatewayError::Api {
                    status: status.as_u16(),
                    error_code: status.as_str().to_string(),
                    message: body.trim().to_string(),
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
