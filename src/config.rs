//! Configuration loaded from environment variables.

use crate::error::{CheckoutError, Result};
use crate::infrastructure::http::DEFAULT_FACT_API_URL;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the order backend (e.g. http://localhost:8000)
    pub api_url: String,
    /// Public key the payment gateway is opened with
    pub gateway_key: String,
    /// Key for the generative-text endpoint
    pub fact_api_key: String,
    pub fact_api_url: String,
    pub gateway_ready_timeout: Duration,
    pub gateway_poll_interval: Duration,
    pub order_timeout: Duration,
    pub fact_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as
    /// missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                CheckoutError::Config(format!("{key} environment variable is required"))
            })
        };
        let number = |key: &str, default: u64| -> Result<u64> {
            match get(key) {
                Some(raw) => u64::from_str(raw.trim())
                    .map_err(|_| CheckoutError::Config(format!("Invalid {key}: {raw}"))),
                None => Ok(default),
            }
        };

        Ok(Config {
            api_url: required("API_URL")?,
            gateway_key: required("RAZORPAY_KEY_ID")?,
            fact_api_key: required("GEMINI_API_KEY")?,
            fact_api_url: get("FACT_API_URL").unwrap_or_else(|| DEFAULT_FACT_API_URL.to_string()),
            gateway_ready_timeout: Duration::from_millis(number("GATEWAY_READY_TIMEOUT_MS", 1000)?),
            gateway_poll_interval: Duration::from_millis(number("GATEWAY_POLL_INTERVAL_MS", 50)?),
            order_timeout: Duration::from_secs(number("ORDER_TIMEOUT_SECS", 15)?),
            fact_timeout: Duration::from_secs(number("FACT_TIMEOUT_SECS", 5)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("API_URL", "http://localhost:8000"),
        ("RAZORPAY_KEY_ID", "rzp_test_123"),
        ("GEMINI_API_KEY", "gm-key"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.fact_api_url, DEFAULT_FACT_API_URL);
        assert_eq!(config.gateway_ready_timeout, Duration::from_millis(1000));
        assert_eq!(config.gateway_poll_interval, Duration::from_millis(50));
        assert_eq!(config.order_timeout, Duration::from_secs(15));
        assert_eq!(config.fact_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_required_key() {
        for missing in ["API_URL", "RAZORPAY_KEY_ID", "GEMINI_API_KEY"] {
            let pairs: Vec<(&str, &str)> =
                REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, CheckoutError::Config(ref m) if m.contains(missing)));
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("RAZORPAY_KEY_ID", "  ");
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GATEWAY_READY_TIMEOUT_MS", "2500"));
        pairs.push(("FACT_API_URL", "http://facts.local/generate"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.gateway_ready_timeout, Duration::from_millis(2500));
        assert_eq!(config.fact_api_url, "http://facts.local/generate");

        pairs.push(("ORDER_TIMEOUT_SECS", "soon"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Invalid ORDER_TIMEOUT_SECS: soon");
    }
}
