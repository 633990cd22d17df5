#![allow(dead_code)]

use async_trait::async_trait;
use contribute::application::facts::FactProvider;
use contribute::application::orchestrator::{CheckoutOrchestrator, CheckoutSettings};
use contribute::application::readiness::{GatewayReadinessMonitor, GatewayScript};
use contribute::domain::contributor::ContributorInfo;
use contribute::domain::order::{OrderRequest, OrderResponse};
use contribute::domain::ports::{OrderService, OrderServiceBox};
use contribute::error::Result;
use contribute::infrastructure::in_memory::InMemoryGateway;
use std::sync::Arc;

pub const GATEWAY_KEY: &str = "rzp_test_key";

/// Lets a test keep a handle on an order service the orchestrator owns.
pub struct SharedOrders<T>(pub Arc<T>);

#[async_trait]
impl<T: OrderService> OrderService for SharedOrders<T> {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse> {
        self.0.create_order(request).await
    }
}

pub fn shared<T: OrderService + 'static>(service: &Arc<T>) -> OrderServiceBox {
    Box::new(SharedOrders(service.clone()))
}

pub fn checkout(
    gateway: &Arc<InMemoryGateway>,
    orders: OrderServiceBox,
    facts: FactProvider,
) -> CheckoutOrchestrator {
    CheckoutOrchestrator::new(
        CheckoutSettings::new(GATEWAY_KEY),
        GatewayReadinessMonitor::new(gateway.clone(), Arc::new(GatewayScript::new())),
        orders,
        facts,
    )
}

pub fn contributor() -> ContributorInfo {
    ContributorInfo {
        name: "Kavya Rao".to_string(),
        email: "kavya@example.com".to_string(),
        mobile: "9876543210".to_string(),
        address: "Bengaluru".to_string(),
        anonymous: false,
    }
}

pub async fn fill(checkout: &CheckoutOrchestrator, info: ContributorInfo) {
    checkout
        .update_contributor(move |c| *c = info)
        .await
        .unwrap();
}
