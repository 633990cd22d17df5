use super::render::format_minor_units;
use crate::domain::order::GatewayOptions;
use crate::domain::payment::PaymentCallbacks;
use crate::domain::ports::PaymentGateway;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::Mutex;
use tracing::debug;

/// Line input shared between the gateway and whoever else prompts the user.
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

/// A payment gateway operated from the terminal.
///
/// Opening it prints the order and waits, in the background, for the user
/// to type a payment id. A blank line or end of input dismisses it.
pub struct TerminalGateway<R> {
    input: SharedLines<R>,
    loaded: AtomicBool,
}

impl<R> TerminalGateway<R> {
    pub fn new(input: SharedLines<R>) -> Self {
        Self {
            input,
            loaded: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl<R> PaymentGateway for TerminalGateway<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn load(&self) -> Result<()> {
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    async fn open(&self, options: GatewayOptions, callbacks: PaymentCallbacks) -> Result<()> {
        println!("── {} ──", options.name);
        println!("Order:    {}", options.order_id);
        println!(
            "Amount:   {} {}",
            options.currency,
            format_minor_units(options.amount)
        );
        if !options.prefill.name.is_empty() {
            println!("Payer:    {} <{}>", options.prefill.name, options.prefill.email);
        }
        println!("Enter the payment id to complete, or a blank line to cancel:");

        let input = self.input.clone();
        tokio::spawn(async move {
            let line = input.lock().await.next_line().await;
            match line {
                Ok(Some(line)) if !line.trim().is_empty() => {
                    callbacks.succeed(line.trim());
                }
                Ok(_) => {
                    callbacks.dismiss();
                }
                Err(e) => {
                    debug!("Terminal input failed: {}", e);
                    callbacks.dismiss();
                }
            }
        });
        Ok(())
    }
}
