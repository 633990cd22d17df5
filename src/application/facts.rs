use crate::domain::ports::FactSourceBox;
use rand::seq::SliceRandom;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

pub const DEFAULT_FACT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shown when the generative endpoint cannot supply a fact.
pub const FALLBACK_FACTS: [&str; 5] = [
    "Over 150M children globally work in child labor, missing education.",
    "59M children lack access to primary education, mostly in low-income areas.",
    "1 in 4 underprivileged children faces malnutrition, stunting growth.",
    "152M children live in extreme poverty, surviving on less than $1.90/day.",
    "Many underprivileged children lack clean water, risking health daily.",
];

/// Builds the prompt for one fact. The timestamp nudges the model away from
/// repeating itself.
pub fn fact_prompt(timestamp_millis: i64) -> String {
    format!(
        "Provide a unique, concise fact (max 100 characters) about underprivileged children, \
         different from previous responses. Timestamp: {timestamp_millis}"
    )
}

/// Supplies the "did you know" line on the confirmation screen.
///
/// [`FactProvider::fetch_fact`] never fails: any error, timeout or empty
/// answer from the source is replaced by one of [`FALLBACK_FACTS`].
pub struct FactProvider {
    source: Option<FactSourceBox>,
    timeout: Duration,
}

impl FactProvider {
    pub fn new(source: FactSourceBox) -> Self {
        Self {
            source: Some(source),
            timeout: DEFAULT_FACT_TIMEOUT,
        }
    }

    /// A provider with no remote source; always serves fallback facts.
    pub fn offline() -> Self {
        Self {
            source: None,
            timeout: DEFAULT_FACT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn fetch_fact(&self) -> String {
        let Some(source) = &self.source else {
            return fallback_fact();
        };

        let prompt = fact_prompt(chrono::Utc::now().timestamp_millis());
        match timeout(self.timeout, source.generate(&prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!("Fetched fact from remote source");
                text.trim().to_string()
            }
            Ok(Ok(_)) => {
                warn!("Fact source returned empty text, using fallback");
                fallback_fact()
            }
            Ok(Err(e)) => {
                warn!("Error fetching fact, using fallback: {}", e);
                fallback_fact()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Fact fetch timed out, using fallback"
                );
                fallback_fact()
            }
        }
    }
}

pub(crate) fn fallback_fact() -> String {
    FALLBACK_FACTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_FACTS[0])
        .to_string()
}
