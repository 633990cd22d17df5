use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Produced only by the gateway's success callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub payment_id: String,
}

/// How one opened gateway UI ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayResult {
    Paid(PaymentOutcome),
    Dismissed,
}

/// The success handler and the dismiss hook handed to the gateway.
///
/// Both share one single-shot sender: whichever fires first resolves the
/// attempt and every later call is a no-op. Clones share the same signal.
#[derive(Debug, Clone)]
pub struct PaymentCallbacks {
    sender: Arc<Mutex<Option<oneshot::Sender<GatewayResult>>>>,
}

/// Creates the callbacks for one gateway attempt and the receiver the
/// orchestrator awaits.
pub fn payment_channel() -> (PaymentCallbacks, oneshot::Receiver<GatewayResult>) {
    let (tx, rx) = oneshot::channel();
    let callbacks = PaymentCallbacks {
        sender: Arc::new(Mutex::new(Some(tx))),
    };
    (callbacks, rx)
}

impl PaymentCallbacks {
    /// The gateway's success handler. Returns false if the attempt had
    /// already resolved.
    pub fn succeed(&self, payment_id: impl Into<String>) -> bool {
        self.resolve(GatewayResult::Paid(PaymentOutcome {
            payment_id: payment_id.into(),
        }))
    }

    /// The gateway's modal-dismiss hook.
    pub fn dismiss(&self) -> bool {
        self.resolve(GatewayResult::Dismissed)
    }

    pub fn is_resolved(&self) -> bool {
        match self.sender.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    fn resolve(&self, result: GatewayResult) -> bool {
        let taken = match self.sender.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match taken {
            // The receiver may already be gone; the attempt still counts as resolved.
            Some(tx) => {
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_resolves_once() {
        let (callbacks, rx) = payment_channel();
        assert!(callbacks.succeed("pay_1"));
        assert!(!callbacks.dismiss());
        assert!(!callbacks.succeed("pay_2"));
        assert!(callbacks.is_resolved());

        assert_eq!(
            rx.await.unwrap(),
            GatewayResult::Paid(PaymentOutcome {
                payment_id: "pay_1".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_dismiss_wins_when_first() {
        let (callbacks, rx) = payment_channel();
        let handler = callbacks.clone();
        assert!(callbacks.dismiss());
        assert!(!handler.succeed("pay_late"));
        assert_eq!(rx.await.unwrap(), GatewayResult::Dismissed);
    }

    #[tokio::test]
    async fn test_dropped_callbacks_close_the_receiver() {
        let (callbacks, rx) = payment_channel();
        drop(callbacks);
        assert!(rx.await.is_err());
    }
}
