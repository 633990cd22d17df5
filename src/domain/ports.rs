use super::order::{GatewayOptions, OrderRequest, OrderResponse};
use super::payment::PaymentCallbacks;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Creates orders on the payment backend.
///
/// Implementations report every failure as `CheckoutError::OrderCreationFailed`.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse>;
}

/// The externally loaded payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Starts loading the gateway capability. Readiness is observed through
    /// [`PaymentGateway::is_ready`], not through this call returning.
    async fn load(&self) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// Opens the payment UI. The outcome arrives later through `callbacks`.
    async fn open(&self, options: GatewayOptions, callbacks: PaymentCallbacks) -> Result<()>;
}

/// A generative-text endpoint that can answer a short prompt.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub type OrderServiceBox = Box<dyn OrderService>;
/// The gateway is shared by the readiness monitor and the orchestrator.
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type FactSourceBox = Box<dyn FactSource>;
