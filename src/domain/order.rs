use super::amount::Total;
use super::contributor::ContributorInfo;
use serde::{Deserialize, Serialize};

/// The only currency the checkout deals in.
pub const CURRENCY: &str = "INR";

/// Shown in the gateway when the order backend does not name the merchant.
pub const DEFAULT_DISPLAY_NAME: &str = "Fundraiser Contribution";

pub const THEME_COLOR: &str = "#3399cc";

/// Body of `POST /api/create-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub amount: u64,
    pub currency: String,
}

impl OrderRequest {
    pub fn for_total(total: &Total) -> Self {
        Self {
            amount: total.rounded_units(),
            currency: CURRENCY.to_string(),
        }
    }
}

/// An order created by the backend.
///
/// `amount` is whatever the backend returned, in the gateway's unit. It is
/// handed to the gateway untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderResponse {
    pub amount: u64,
    pub currency: String,
    pub order_id: String,
    pub display_name: String,
}

/// Contact details the gateway pre-fills in its own form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

impl Prefill {
    /// Anonymous contributors get an empty prefill.
    pub fn for_contributor(info: &ContributorInfo) -> Self {
        if info.anonymous {
            return Self::default();
        }
        Self {
            name: info.name.clone(),
            email: info.email.clone(),
            contact: info.mobile.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub color: String,
}

/// Everything the gateway needs to open its payment UI for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayOptions {
    pub key: String,
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub order_id: String,
    pub prefill: Prefill,
    pub theme: Theme,
}

impl GatewayOptions {
    pub fn new(key: &str, order: &OrderResponse, contributor: &ContributorInfo) -> Self {
        Self {
            key: key.to_string(),
            amount: order.amount,
            currency: order.currency.clone(),
            name: order.display_name.clone(),
            order_id: order.order_id.clone(),
            prefill: Prefill::for_contributor(contributor),
            theme: Theme {
                color: THEME_COLOR.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::{ContributionSelection, compute_total};

    fn contributor(anonymous: bool) -> ContributorInfo {
        ContributorInfo {
            name: "Ravi".to_string(),
            email: "ravi@example.in".to_string(),
            mobile: "9123456780".to_string(),
            address: "Pune".to_string(),
            anonymous,
        }
    }

    fn order() -> OrderResponse {
        OrderResponse {
            amount: 275_000,
            currency: CURRENCY.to_string(),
            order_id: "order_abc".to_string(),
            display_name: "Your Org Name".to_string(),
        }
    }

    #[test]
    fn test_request_uses_rounded_total() {
        let selection = ContributionSelection::new(1000, "10.05", 5).unwrap();
        let request = OrderRequest::for_total(&compute_total(&selection).unwrap());
        assert_eq!(request.amount, 11);
        assert_eq!(request.currency, "INR");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "amount": 11, "currency": "INR" })
        );
    }

    #[test]
    fn test_options_carry_order_amount_verbatim() {
        let options = GatewayOptions::new("rzp_test_key", &order(), &contributor(false));
        assert_eq!(options.amount, 275_000);
        assert_eq!(options.order_id, "order_abc");
        assert_eq!(options.prefill.contact, "9123456780");
        assert_eq!(options.theme.color, THEME_COLOR);
    }

    #[test]
    fn test_anonymous_prefill_is_withheld() {
        let options = GatewayOptions::new("rzp_test_key", &order(), &contributor(true));
        assert_eq!(options.prefill, Prefill::default());

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["prefill"]["name"], "");
        assert_eq!(json["order_id"], "order_abc");
    }
}
