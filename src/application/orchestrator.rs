use super::facts::{FactProvider, fallback_fact};
use super::readiness::{DEFAULT_READY_TIMEOUT, GatewayReadinessMonitor};
use crate::domain::amount::{ContributionSelection, Total, compute_total};
use crate::domain::contributor::{self, ContributorInfo, ValidationErrors};
use crate::domain::order::{GatewayOptions, OrderRequest};
use crate::domain::payment::{GatewayResult, payment_channel};
use crate::domain::ports::OrderServiceBox;
use crate::domain::state::{CheckoutState, Notice};
use crate::error::{CheckoutError, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Values the orchestrator needs from configuration.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Public key handed to the gateway.
    pub gateway_key: String,
    pub ready_timeout: Duration,
}

impl CheckoutSettings {
    pub fn new(gateway_key: &str) -> Self {
        Self {
            gateway_key: gateway_key.to_string(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }
}

/// What the confirmation screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub payment_id: String,
    pub fact: String,
}

/// How a call to [`CheckoutOrchestrator::submit`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another attempt is outstanding, or a confirmation awaits acknowledgment.
    Ignored(CheckoutState),
    Invalid(ValidationErrors),
    Failed(Notice),
    /// The user closed the gateway without paying.
    Cancelled,
    Confirmed(Confirmation),
}

/// The state of one checkout session, as rendered by a front end.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: CheckoutState,
    selection: ContributionSelection,
    contributor: ContributorInfo,
    errors: ValidationErrors,
    notice: Option<Notice>,
    payment_id: Option<String>,
    fact: Option<String>,
}

impl Session {
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn selection(&self) -> &ContributionSelection {
        &self.selection
    }

    pub fn contributor(&self) -> &ContributorInfo {
        &self.contributor
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// `None` while the current selection does not yield a valid total.
    pub fn total(&self) -> Option<Total> {
        compute_total(&self.selection).ok()
    }

    pub fn submit_enabled(&self) -> bool {
        self.state == CheckoutState::Editing
    }

    pub fn submit_label(&self) -> String {
        if self.state.is_busy() {
            return "Loading...".to_string();
        }
        match self.total() {
            Some(total) => format!("Proceed To Contribute ₹{total}"),
            None => "Proceed To Contribute".to_string(),
        }
    }

    pub fn confirmation(&self) -> Option<Confirmation> {
        if self.state != CheckoutState::Confirmed {
            return None;
        }
        Some(Confirmation {
            payment_id: self.payment_id.clone()?,
            fact: self.fact.clone()?,
        })
    }

    fn transition(&mut self, to: CheckoutState) {
        info!(from = %self.state, to = %to, "Checkout state changed");
        self.state = to;
    }
}

/// Drives a checkout session from form submission to acknowledged confirmation.
///
/// The session lock is only held between suspension points, never across a
/// call to the gateway, the order backend or the fact source. A submission
/// claims the session by leaving `Editing`, so concurrent submits are ignored.
pub struct CheckoutOrchestrator {
    session: Mutex<Session>,
    monitor: GatewayReadinessMonitor,
    orders: OrderServiceBox,
    facts: FactProvider,
    settings: CheckoutSettings,
}

impl CheckoutOrchestrator {
    pub fn new(
        settings: CheckoutSettings,
        monitor: GatewayReadinessMonitor,
        orders: OrderServiceBox,
        facts: FactProvider,
    ) -> Self {
        Self {
            session: Mutex::new(Session::default()),
            monitor,
            orders,
            facts,
            settings,
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn state(&self) -> CheckoutState {
        self.session.lock().await.state
    }

    pub async fn select_preset(&self, preset: u32) -> Result<()> {
        self.edit(|session| session.selection.select_preset(preset))
            .await
    }

    pub async fn choose_other_amount(&self) -> Result<()> {
        self.edit(|session| {
            session.selection.choose_other();
            Ok(())
        })
        .await
    }

    pub async fn set_custom_amount(&self, raw: &str) -> Result<()> {
        self.edit(|session| {
            session.selection.set_custom_amount(raw);
            Ok(())
        })
        .await
    }

    pub async fn set_tip(&self, tip_percent: u32) -> Result<()> {
        self.edit(|session| session.selection.set_tip(tip_percent))
            .await
    }

    pub async fn update_contributor<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut ContributorInfo),
    {
        self.edit(|session| {
            update(&mut session.contributor);
            Ok(())
        })
        .await
    }

    async fn edit<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let mut session = self.session.lock().await;
        if session.state != CheckoutState::Editing {
            return Err(CheckoutError::NotAllowed(session.state));
        }
        apply(&mut session)
    }

    /// Runs one checkout attempt to completion.
    ///
    /// Every failure leaves the session back in `Editing` with a notice set;
    /// a cancelled payment returns there without one. Dropping the returned
    /// future mid-attempt also hands the session back to `Editing`, or to
    /// `Confirmed` if the payment already went through.
    pub async fn submit(&self) -> SubmitOutcome {
        let (total, contributor) = {
            let mut session = self.session.lock().await;
            if session.state != CheckoutState::Editing {
                debug!(state = %session.state, "Submit ignored");
                return SubmitOutcome::Ignored(session.state);
            }
            session.notice = None;
            session.errors = contributor::validate(&session.contributor);
            if !session.errors.is_empty() {
                debug!(fields = %session.errors, "Contributor validation failed");
                return SubmitOutcome::Invalid(session.errors.clone());
            }
            let total = match compute_total(&session.selection) {
                Ok(total) => total,
                Err(e) => {
                    warn!("Rejected contribution amount: {}", e);
                    session.notice = Some(Notice::InvalidAmount);
                    return SubmitOutcome::Failed(Notice::InvalidAmount);
                }
            };
            session.transition(CheckoutState::AwaitingGatewayReady);
            (total, session.contributor.clone())
        };

        let claim = Claim::new(&self.session);
        let outcome = self.attempt(total, contributor).await;
        claim.release();
        outcome
    }

    /// The part of a submission that runs with the session claimed.
    async fn attempt(&self, total: Total, contributor: ContributorInfo) -> SubmitOutcome {
        if let Err(e) = self
            .monitor
            .wait_until_ready(self.settings.ready_timeout)
            .await
        {
            return self.fail(Notice::GatewayUnavailable, e).await;
        }
        self.set_state(CheckoutState::AwaitingOrder).await;

        let request = OrderRequest::for_total(&total);
        info!(
            amount = request.amount,
            currency = %request.currency,
            "Creating order"
        );
        let order = match self.orders.create_order(&request).await {
            Ok(order) => order,
            Err(e) => return self.fail(Notice::PaymentInitFailed, e).await,
        };

        let options = GatewayOptions::new(&self.settings.gateway_key, &order, &contributor);
        let (callbacks, result) = payment_channel();
        self.set_state(CheckoutState::AwaitingGatewayResult).await;
        info!(order_id = %order.order_id, amount = order.amount, "Opening payment gateway");
        if let Err(e) = self.monitor.gateway().open(options, callbacks).await {
            return self.fail(Notice::PaymentInitFailed, e).await;
        }

        let outcome = match result.await {
            Ok(GatewayResult::Paid(outcome)) => outcome,
            Ok(GatewayResult::Dismissed) => {
                info!(order_id = %order.order_id, "Payment dismissed by user");
                self.set_state(CheckoutState::Editing).await;
                return SubmitOutcome::Cancelled;
            }
            Err(_) => {
                warn!(order_id = %order.order_id, "Gateway closed without reporting a result");
                self.set_state(CheckoutState::Editing).await;
                return SubmitOutcome::Cancelled;
            }
        };

        {
            let mut session = self.session.lock().await;
            info!(payment_id = %outcome.payment_id, "Payment succeeded");
            session.payment_id = Some(outcome.payment_id.clone());
            session.fact = None;
            session.transition(CheckoutState::Confirming);
        }

        let fact = self.facts.fetch_fact().await;

        let mut session = self.session.lock().await;
        session.fact = Some(fact.clone());
        session.transition(CheckoutState::Confirmed);
        SubmitOutcome::Confirmed(Confirmation {
            payment_id: outcome.payment_id,
            fact,
        })
    }

    /// Dismisses the confirmation and starts a fresh session.
    ///
    /// This is the only place contributor details are cleared.
    pub async fn acknowledge(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.state != CheckoutState::Confirmed {
            return Err(CheckoutError::NotAllowed(session.state));
        }
        session.transition(CheckoutState::Editing);
        *session = Session::default();
        Ok(())
    }

    async fn set_state(&self, to: CheckoutState) {
        self.session.lock().await.transition(to);
    }

    async fn fail(&self, notice: Notice, error: CheckoutError) -> SubmitOutcome {
        warn!("Checkout attempt failed: {}", error);
        let mut session = self.session.lock().await;
        session.notice = Some(notice);
        session.transition(CheckoutState::Editing);
        SubmitOutcome::Failed(notice)
    }
}

/// Hands a claimed session back if a submission is dropped before it ends.
struct Claim<'a> {
    session: &'a Mutex<Session>,
    armed: bool,
}

impl<'a> Claim<'a> {
    fn new(session: &'a Mutex<Session>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn release(mut self) {
        self.armed = false;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // The lock is never held across an await, so it is free here unless
        // another task is in the middle of a short critical section.
        let Ok(mut session) = self.session.try_lock() else {
            warn!("Submission dropped while the session was locked");
            return;
        };
        warn!(state = %session.state, "Submission dropped before completing");
        if session.state == CheckoutState::Confirming && session.payment_id.is_some() {
            session.fact = Some(fallback_fact());
            session.transition(CheckoutState::Confirmed);
        } else if session.state.is_busy() {
            session.transition(CheckoutState::Editing);
        }
    }
}
