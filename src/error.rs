use crate::domain::state::CheckoutState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid contribution amount: {0}")]
    InvalidAmount(String),
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("Order creation failed: {0}")]
    OrderCreationFailed(String),
    #[error("Fact fetch failed: {0}")]
    FactFetchFailed(String),
    #[error("Action not allowed while {0}")]
    NotAllowed(CheckoutState),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
