use crate::domain::order::{GatewayOptions, OrderRequest, OrderResponse};
use crate::domain::payment::PaymentCallbacks;
use crate::domain::ports::{FactSource, OrderService, PaymentGateway};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Display name the in-process backend reports, matching the hosted one.
pub const IN_MEMORY_DISPLAY_NAME: &str = "Your Org Name";

/// An order backend that lives in the process.
///
/// Behaves like the hosted endpoint: the whole-rupee amount it receives is
/// returned in paise alongside a freshly minted order id. Every request is
/// recorded so callers can inspect what was sent.
#[derive(Default)]
pub struct InMemoryOrderService {
    requests: RwLock<Vec<OrderRequest>>,
    failure: Option<String>,
    latency: Option<Duration>,
    display_name: Option<String>,
}

impl InMemoryOrderService {
    /// Creates a backend that accepts every positive amount.
    pub fn new() -> Self {
        Self {
            display_name: Some(IN_MEMORY_DISPLAY_NAME.to_string()),
            ..Self::default()
        }
    }

    /// Creates a backend that answers every request with `{"error": message}`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Omits the display name from responses.
    pub fn unnamed(mut self) -> Self {
        self.display_name = None;
        self
    }

    pub async fn requests(&self) -> Vec<OrderRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse> {
        let sequence = {
            let mut requests = self.requests.write().await;
            requests.push(request.clone());
            requests.len()
        };
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(message) = &self.failure {
            return Err(CheckoutError::OrderCreationFailed(message.clone()));
        }
        if request.amount == 0 {
            return Err(CheckoutError::OrderCreationFailed(
                "Amount must be greater than 0".to_string(),
            ));
        }
        let amount = request.amount.checked_mul(100).ok_or_else(|| {
            CheckoutError::OrderCreationFailed(format!("Amount {} is too large", request.amount))
        })?;
        Ok(OrderResponse {
            amount,
            currency: request.currency.clone(),
            order_id: format!("order_mem_{sequence:06}"),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| crate::domain::order::DEFAULT_DISPLAY_NAME.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Readiness {
    Immediate,
    After(Duration),
    Never,
}

/// What the in-memory gateway does once its payment UI is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayBehavior {
    Pay(String),
    Dismiss,
    /// Keeps the callbacks; resolve them through [`InMemoryGateway::pending`].
    Hold,
}

/// A payment gateway simulated in the process.
pub struct InMemoryGateway {
    readiness: Readiness,
    ready_at: Mutex<Option<Instant>>,
    loads: AtomicUsize,
    failing_loads: AtomicUsize,
    behavior: Mutex<GatewayBehavior>,
    opened: Mutex<Vec<GatewayOptions>>,
    pending: Mutex<Option<PaymentCallbacks>>,
}

impl InMemoryGateway {
    fn with_readiness(readiness: Readiness) -> Self {
        Self {
            readiness,
            ready_at: Mutex::new(None),
            loads: AtomicUsize::new(0),
            failing_loads: AtomicUsize::new(0),
            behavior: Mutex::new(GatewayBehavior::Hold),
            opened: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
        }
    }

    pub fn ready() -> Self {
        Self::with_readiness(Readiness::Immediate)
    }

    /// Becomes ready `delay` after the first successful load.
    pub fn ready_after(delay: Duration) -> Self {
        Self::with_readiness(Readiness::After(delay))
    }

    pub fn never_ready() -> Self {
        Self::with_readiness(Readiness::Never)
    }

    /// The next `count` loads fail.
    pub fn failing_loads(self, count: usize) -> Self {
        self.failing_loads.store(count, Ordering::SeqCst);
        self
    }

    pub fn paying(self, payment_id: &str) -> Self {
        self.set_behavior(GatewayBehavior::Pay(payment_id.to_string()));
        self
    }

    pub fn dismissing(self) -> Self {
        self.set_behavior(GatewayBehavior::Dismiss);
        self
    }

    pub fn set_behavior(&self, behavior: GatewayBehavior) {
        *lock(&self.behavior) = behavior;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Options of every payment UI opened so far.
    pub fn opened(&self) -> Vec<GatewayOptions> {
        lock(&self.opened).clone()
    }

    /// Callbacks of the UI currently held open.
    pub fn pending(&self) -> Option<PaymentCallbacks> {
        lock(&self.pending).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn load(&self) -> Result<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_loads.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_loads.store(failing - 1, Ordering::SeqCst);
            return Err(CheckoutError::GatewayUnavailable(
                "script failed to load".to_string(),
            ));
        }
        let now = Instant::now();
        *lock(&self.ready_at) = match self.readiness {
            Readiness::Immediate => Some(now),
            Readiness::After(delay) => Some(now + delay),
            Readiness::Never => None,
        };
        Ok(())
    }

    fn is_ready(&self) -> bool {
        lock(&self.ready_at).is_some_and(|at| Instant::now() >= at)
    }

    async fn open(&self, options: GatewayOptions, callbacks: PaymentCallbacks) -> Result<()> {
        lock(&self.opened).push(options);
        let behavior = lock(&self.behavior).clone();
        match behavior {
            GatewayBehavior::Pay(payment_id) => {
                callbacks.succeed(payment_id);
            }
            GatewayBehavior::Dismiss => {
                callbacks.dismiss();
            }
            GatewayBehavior::Hold => {
                *lock(&self.pending) = Some(callbacks);
            }
        }
        Ok(())
    }
}

/// A fact source with a canned reply.
pub struct InMemoryFactSource {
    reply: std::result::Result<String, String>,
    latency: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl InMemoryFactSource {
    pub fn answering(text: &str) -> Self {
        Self::with_reply(Ok(text.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_reply(Err(message.to_string()))
    }

    fn with_reply(reply: std::result::Result<String, String>) -> Self {
        Self {
            reply,
            latency: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl FactSource for InMemoryFactSource {
    async fn generate(&self, prompt: &str) -> Result<String> {
        lock(&self.prompts).push(prompt.to_string());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.reply
            .clone()
            .map_err(CheckoutError::FactFetchFailed)
    }
}
