//! Application layer containing the checkout orchestration.
//!
//! `CheckoutOrchestrator` is the entry point: it validates the form, waits for
//! the payment gateway, creates the order, awaits the gateway's one-shot
//! result and fetches the confirmation fact.

pub mod facts;
pub mod orchestrator;
pub mod readiness;
