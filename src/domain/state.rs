use std::fmt;

/// Where a checkout session is. Exactly one per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Editing,
    AwaitingGatewayReady,
    AwaitingOrder,
    AwaitingGatewayResult,
    Confirming,
    Confirmed,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Editing => "editing",
            CheckoutState::AwaitingGatewayReady => "awaiting_gateway_ready",
            CheckoutState::AwaitingOrder => "awaiting_order",
            CheckoutState::AwaitingGatewayResult => "awaiting_gateway_result",
            CheckoutState::Confirming => "confirming",
            CheckoutState::Confirmed => "confirmed",
        }
    }

    /// A request is outstanding: submit is disabled.
    pub fn is_busy(&self) -> bool {
        !matches!(self, CheckoutState::Editing | CheckoutState::Confirmed)
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message shown to the user after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    InvalidAmount,
    GatewayUnavailable,
    PaymentInitFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::InvalidAmount => "Please enter a valid amount.",
            Notice::GatewayUnavailable => "Payment system unavailable. Please try again.",
            Notice::PaymentInitFailed => "Failed to initiate payment. Please try again.",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
