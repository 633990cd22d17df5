//! HTTP adapters for the order backend and the generative-text endpoint.
//!
//! Both translate every transport, status and decoding problem into the
//! matching `CheckoutError` kind so callers never see a `reqwest` error.

use crate::domain::order::{DEFAULT_DISPLAY_NAME, OrderRequest, OrderResponse};
use crate::domain::ports::{FactSource, OrderService};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const CREATE_ORDER_PATH: &str = "/api/create-order";
pub const DEFAULT_FACT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

fn client_with_timeout(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CheckoutError::Config(format!("HTTP client: {e}")))
}

/// Either shape the order endpoint answers with.
#[derive(Debug, Deserialize)]
struct CreateOrderReply {
    error: Option<String>,
    amount: Option<u64>,
    currency: Option<String>,
    #[serde(rename = "orderId")]
    order_id: Option<String>,
    name: Option<String>,
}

/// Calls `POST {base}/api/create-order`.
pub struct HttpOrderService {
    client: Client,
    endpoint: String,
}

impl HttpOrderService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(client_with_timeout(timeout)?, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CREATE_ORDER_PATH),
        }
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse> {
        let failed = |message: String| CheckoutError::OrderCreationFailed(message);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        debug!(%status, "Order endpoint replied");

        // The error field wins over the status: the backend pairs its
        // non-2xx codes with a JSON message.
        let reply = serde_json::from_str::<CreateOrderReply>(&body).ok();
        if let Some(error) = reply.as_ref().and_then(|r| r.error.clone()) {
            return Err(failed(error));
        }
        if !status.is_success() {
            return Err(failed(format!("order endpoint returned {status}")));
        }
        let reply = reply.ok_or_else(|| failed("malformed order response".to_string()))?;
        let (Some(amount), Some(order_id)) = (reply.amount, reply.order_id) else {
            return Err(failed("order response missing amount or orderId".to_string()));
        };

        Ok(OrderResponse {
            amount,
            currency: reply.currency.unwrap_or_else(|| request.currency.clone()),
            order_id,
            display_name: reply
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateReply {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Asks a `generateContent` endpoint for a short text.
pub struct GeminiFactSource {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiFactSource {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(
            client_with_timeout(timeout)?,
            endpoint,
            api_key,
        ))
    }

    pub fn with_client(client: Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl FactSource for GeminiFactSource {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let failed = |message: String| CheckoutError::FactFetchFailed(message);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("fact endpoint returned {status}")));
        }
        let reply: GenerateReply = response.json().await.map_err(|e| failed(e.to_string()))?;
        reply
            .first_text()
            .ok_or_else(|| failed("response has no candidate text".to_string()))
    }
}
