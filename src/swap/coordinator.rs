use std::sync::Arc;

use crate::models::Signal;
use crate::wallet::WalletStatus;

use super::amount::{AmountCollector, EntryBlocked, EntryPolicy};
use super::error::SwapError;
use super::executor::{ActiveSwap, ConfirmationOutcome, StepExecutor, StepOutcome};
use super::planner::SwapPlanner;

/// The single swap slot. At most one plan exists at a time.
#[derive(Debug, Clone, Default)]
pub enum SwapState {
    #[default]
    Idle,
    /// The amount prompt is open for one selected signal.
    Collecting(AmountCollector),
    /// A plan is being signed step by step.
    Active(ActiveSwap),
}

/// Ties the feed to the swap flow: signal selection, amount entry, plan
/// request, step approval and confirmation.
///
/// Every operation takes `&mut self`, so a second submission cannot start
/// while one is awaiting the planner, the wallet, or the chain.
pub struct SwapCoordinator {
    planner: Arc<dyn SwapPlanner>,
    executor: StepExecutor,
    policy: EntryPolicy,
    state: SwapState,
    last_error: Option<String>,
}

impl SwapCoordinator {
    pub fn new(planner: Arc<dyn SwapPlanner>, executor: StepExecutor, policy: EntryPolicy) -> Self {
        Self {
            planner,
            executor,
            policy,
            state: SwapState::Idle,
            last_error: None,
        }
    }

    pub fn state(&self) -> &SwapState {
        &self.state
    }

    /// User-facing message of the most recent failure, if not yet cleared.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn active(&self) -> Option<&ActiveSwap> {
        match &self.state {
            SwapState::Active(swap) => Some(swap),
            _ => None,
        }
    }

    /// Index of the step awaiting approval; 0 when no plan is active.
    pub fn cursor(&self) -> usize {
        self.active().map(ActiveSwap::cursor).unwrap_or(0)
    }

    /// The active plan, only when it trades into this signal's token.
    pub fn plan_for(&self, signal: &Signal) -> Option<&ActiveSwap> {
        let swap = self.active()?;
        let symbol = signal.token_symbol()?;
        swap.plan().trades_into(symbol).then_some(swap)
    }

    /// Open the amount prompt for `signal`.
    ///
    /// A plan in flight is never cancelled by a new selection; the selection
    /// is refused instead.
    pub fn select_signal(
        &mut self,
        signal: &Signal,
        wallet: &WalletStatus,
    ) -> Result<(), EntryBlocked> {
        if let SwapState::Active(swap) = &self.state {
            return Err(EntryBlocked::PlanPending {
                token: swap.plan().token_symbol.clone(),
            });
        }

        self.last_error = None;
        let collector = AmountCollector::open(&self.policy, signal, wallet).inspect_err(|blocked| {
            tracing::info!(signal_id = %signal.id, reason = %blocked, "Swap entry blocked");
        })?;
        self.state = SwapState::Collecting(collector);
        Ok(())
    }

    pub fn set_amount(&mut self, text: impl Into<String>) {
        if let SwapState::Collecting(collector) = &mut self.state {
            collector.set_input(text);
        }
    }

    /// Whether the amount prompt's submit control is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(&self.state, SwapState::Collecting(c) if c.can_submit())
    }

    pub fn cancel_amount(&mut self) {
        if matches!(self.state, SwapState::Collecting(_)) {
            self.state = SwapState::Idle;
        }
    }

    /// Validate the entered amount and request a plan for it.
    ///
    /// An invalid amount keeps the prompt open and never reaches the planner.
    /// Any planner failure leaves the slot idle with the error recorded.
    pub async fn submit_amount(&mut self, wallet_address: &str) -> Result<(), SwapError> {
        let SwapState::Collecting(collector) = &self.state else {
            return Err(SwapError::NoActiveSwap);
        };
        let confirmed = collector.confirm()?;
        self.state = SwapState::Idle;

        match self
            .planner
            .request_plan(&confirmed.amount_text, &confirmed.signal, wallet_address)
            .await
        {
            Ok(plan) => {
                self.state = SwapState::Active(ActiveSwap::new(plan));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Sign the current step. A signing failure discards the whole plan; an
    /// out-of-order approval leaves it as is.
    pub async fn approve_current(&mut self) -> Result<StepOutcome, SwapError> {
        let SwapState::Active(swap) = &mut self.state else {
            return Err(SwapError::NoActiveSwap);
        };

        match self.executor.approve_current(swap).await {
            Ok(outcome) => Ok(outcome),
            Err(e @ (SwapError::NothingToApprove | SwapError::AwaitingConfirmation(_))) => Err(e),
            Err(e) => Err(self.discard(e)),
        }
    }

    /// Wait for the last signed step. The final step's confirmation ends the swap.
    pub async fn await_confirmation(&mut self) -> Result<ConfirmationOutcome, SwapError> {
        let SwapState::Active(swap) = &mut self.state else {
            return Ok(ConfirmationOutcome::Idle);
        };

        match self.executor.await_confirmation(swap).await {
            Ok(outcome @ ConfirmationOutcome::Completed { .. }) => {
                self.state = SwapState::Idle;
                Ok(outcome)
            }
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.discard(e)),
        }
    }

    /// Drop the active plan without any network or wallet call.
    pub fn reject_current(&mut self) {
        if let SwapState::Active(swap) = &self.state {
            tracing::info!(plan = %swap.plan(), cursor = swap.cursor(), "Swap plan rejected");
            self.state = SwapState::Idle;
        }
        self.last_error = None;
    }

    fn discard(&mut self, err: SwapError) -> SwapError {
        if let SwapState::Active(swap) = &self.state {
            tracing::warn!(plan = %swap.plan(), cursor = swap.cursor(), error = %err, "Swap plan discarded");
        }
        self.state = SwapState::Idle;
        self.fail(err)
    }

    fn fail(&mut self, err: SwapError) -> SwapError {
        self.last_error = Some(err.to_string());
        err
    }
}
