use crate::domain::ports::{PaymentGateway, PaymentGatewayRef};
use crate::error::{CheckoutError, Result};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const GATEWAY_SCRIPT_URL: &str = "https://checkout.razorpay.com/v1/checkout.js";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(1000);

/// The "gateway script loaded" flag.
///
/// Set at most once and never unset. A failed load leaves it clear so the
/// next checkout attempt tries again.
#[derive(Debug, Default)]
pub struct GatewayScript {
    injected: OnceCell<()>,
}

impl GatewayScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance.
    pub fn global() -> Arc<GatewayScript> {
        static SCRIPT: OnceLock<Arc<GatewayScript>> = OnceLock::new();
        SCRIPT.get_or_init(|| Arc::new(GatewayScript::new())).clone()
    }

    /// Triggers the gateway load unless it already happened.
    pub async fn ensure_loaded(&self, gateway: &dyn PaymentGateway) -> Result<()> {
        self.injected
            .get_or_try_init(|| async {
                info!(url = GATEWAY_SCRIPT_URL, "Loading payment gateway script");
                gateway.load().await
            })
            .await?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.injected.initialized()
    }
}

/// Waits, with a bound, for the gateway to become callable.
pub struct GatewayReadinessMonitor {
    gateway: PaymentGatewayRef,
    script: Arc<GatewayScript>,
    poll_interval: Duration,
}

impl GatewayReadinessMonitor {
    pub fn new(gateway: PaymentGatewayRef, script: Arc<GatewayScript>) -> Self {
        Self {
            gateway,
            script,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn gateway(&self) -> &PaymentGatewayRef {
        &self.gateway
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Resolves once the gateway reports ready, or fails with
    /// `GatewayUnavailable` when `timeout` elapses first.
    ///
    /// The bound covers the script load as well as the polling.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let load = self.script.ensure_loaded(self.gateway.as_ref());
        match tokio::time::timeout_at(deadline, load).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Payment gateway failed to load: {}", e);
                return Err(CheckoutError::GatewayUnavailable(e.to_string()));
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Payment gateway script did not load in time"
                );
                return Err(CheckoutError::GatewayUnavailable(format!(
                    "gateway script not loaded within {}ms",
                    timeout.as_millis()
                )));
            }
        }

        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;
            if self.gateway.is_ready() {
                debug!("Payment gateway ready");
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Payment gateway not ready in time"
                );
                return Err(CheckoutError::GatewayUnavailable(format!(
                    "gateway not ready within {}ms",
                    timeout.as_millis()
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::GatewayOptions;
    use crate::domain::payment::PaymentCallbacks;
    use crate::infrastructure::in_memory::InMemoryGateway;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Loads slowly the first time and instantly afterwards.
    #[derive(Default)]
    struct StallingGateway {
        loads: AtomicUsize,
        ready: AtomicBool,
    }

    #[async_trait]
    impl PaymentGateway for StallingGateway {
        async fn load(&self) -> Result<()> {
            if self.loads.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            self.ready.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }

        async fn open(&self, _options: GatewayOptions, _callbacks: PaymentCallbacks) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_delay() {
        let gateway = Arc::new(InMemoryGateway::ready_after(Duration::from_millis(200)));
        let monitor = GatewayReadinessMonitor::new(gateway.clone(), Arc::new(GatewayScript::new()));

        let started = Instant::now();
        monitor
            .wait_until_ready(DEFAULT_READY_TIMEOUT)
            .await
            .unwrap();
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(200));
        assert!(waited < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_never_ready() {
        let gateway = Arc::new(InMemoryGateway::never_ready());
        let monitor = GatewayReadinessMonitor::new(gateway, Arc::new(GatewayScript::new()));

        let started = Instant::now();
        let result = monitor.wait_until_ready(Duration::from_millis(1000)).await;
        assert!(matches!(result, Err(CheckoutError::GatewayUnavailable(_))));
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(started.elapsed() < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_loaded_once() {
        let gateway = Arc::new(InMemoryGateway::ready());
        let script = Arc::new(GatewayScript::new());
        let monitor = GatewayReadinessMonitor::new(gateway.clone(), script.clone());
        assert!(!script.is_loaded());

        monitor.wait_until_ready(DEFAULT_READY_TIMEOUT).await.unwrap();
        monitor.wait_until_ready(DEFAULT_READY_TIMEOUT).await.unwrap();
        let second = GatewayReadinessMonitor::new(gateway.clone(), script.clone());
        second.wait_until_ready(DEFAULT_READY_TIMEOUT).await.unwrap();

        assert!(script.is_loaded());
        assert_eq!(gateway.load_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_is_retried() {
        let gateway = Arc::new(InMemoryGateway::ready().failing_loads(1));
        let script = Arc::new(GatewayScript::new());
        let monitor = GatewayReadinessMonitor::new(gateway.clone(), script.clone());

        let first = monitor.wait_until_ready(DEFAULT_READY_TIMEOUT).await;
        assert!(matches!(first, Err(CheckoutError::GatewayUnavailable(_))));
        assert!(!script.is_loaded());

        monitor.wait_until_ready(DEFAULT_READY_TIMEOUT).await.unwrap();
        assert!(script.is_loaded());
        assert_eq!(gateway.load_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_load_is_bounded() {
        let gateway = Arc::new(StallingGateway::default());
        let script = Arc::new(GatewayScript::new());
        let monitor = GatewayReadinessMonitor::new(gateway.clone(), script.clone());

        let started = Instant::now();
        let result = monitor.wait_until_ready(Duration::from_millis(1000)).await;
        assert!(matches!(result, Err(CheckoutError::GatewayUnavailable(_))));
        assert!(started.elapsed() < Duration::from_millis(1100));
        assert!(!script.is_loaded());

        // The abandoned load leaves the flag clear, so the next attempt loads again.
        monitor.wait_until_ready(DEFAULT_READY_TIMEOUT).await.unwrap();
        assert!(script.is_loaded());
        assert_eq!(gateway.loads.load(Ordering::SeqCst), 2);
    }
}
