use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::TxHash;
use metrics::counter;

use crate::models::{SwapPlan, SwapStep};
use crate::wallet::{ChainWatcher, ConfirmationStatus, WalletSigner};

use super::error::SwapError;

/// A plan being executed, with the index of the next step awaiting signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSwap {
    plan: SwapPlan,
    cursor: usize,
    /// Most recently broadcast transaction not yet observed as confirmed.
    tx_hash: Option<TxHash>,
    /// Set once the final step has been signed.
    fully_submitted: bool,
}

impl ActiveSwap {
    pub fn new(plan: SwapPlan) -> Self {
        Self {
            plan,
            cursor: 0,
            tx_hash: None,
            fully_submitted: false,
        }
    }

    pub fn plan(&self) -> &SwapPlan {
        &self.plan
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        self.tx_hash
    }

    pub fn is_fully_submitted(&self) -> bool {
        self.fully_submitted
    }

    /// The step awaiting approval, if any remains.
    pub fn current_step(&self) -> Option<&SwapStep> {
        if self.fully_submitted {
            return None;
        }
        self.plan.steps.get(self.cursor)
    }

    pub fn is_final_step(&self) -> bool {
        self.cursor + 1 >= self.plan.len()
    }
}

/// Result of signing the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A non-final step was signed and the cursor moved to `next`.
    Advanced { tx_hash: TxHash, next: usize },
    /// The final step was signed; the swap awaits its confirmation.
    Submitted { tx_hash: TxHash },
}

/// Result of waiting on the last broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// No transaction was waiting for confirmation.
    Idle,
    /// An intermediate step was mined; the next step awaits approval.
    StepConfirmed { tx_hash: TxHash },
    /// The final step was mined and the swap is complete.
    Completed { tx_hash: TxHash },
}

/// Signs plan steps strictly in order and waits for their confirmation.
#[derive(Clone)]
pub struct StepExecutor {
    signer: Arc<dyn WalletSigner>,
    watcher: Arc<dyn ChainWatcher>,
    poll_interval: Duration,
}

impl StepExecutor {
    pub fn new(
        signer: Arc<dyn WalletSigner>,
        watcher: Arc<dyn ChainWatcher>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            signer,
            watcher,
            poll_interval,
        }
    }

    /// Ask the wallet to sign `steps[cursor]`.
    ///
    /// Refused while the previous step is unconfirmed. On signing failure the
    /// swap is left untouched; the caller discards it.
    pub async fn approve_current(&self, swap: &mut ActiveSwap) -> Result<StepOutcome, SwapError> {
        let step = swap.current_step().ok_or(SwapError::NothingToApprove)?;
        if let Some(pending) = swap.tx_hash {
            return Err(SwapError::AwaitingConfirmation(pending));
        }
        let index = swap.cursor;

        tracing::info!(
            step = index,
            total = swap.plan.len(),
            to = %step.to,
            value = %step.value,
            "Requesting signature for swap step"
        );

        let tx_hash = self.signer.send_transaction(step).await.map_err(|failure| {
            tracing::warn!(step = index, error = %failure, "Swap step signing failed");
            SwapError::Signing(failure)
        })?;

        counter!("swap_steps_signed_total").increment(1);
        swap.tx_hash = Some(tx_hash);

        if swap.is_final_step() {
            swap.fully_submitted = true;
            tracing::info!(step = index, tx_hash = %tx_hash, "Final swap step submitted");
            Ok(StepOutcome::Submitted { tx_hash })
        } else {
            swap.cursor += 1;
            tracing::info!(step = index, tx_hash = %tx_hash, next = swap.cursor, "Swap step submitted");
            Ok(StepOutcome::Advanced {
                tx_hash,
                next: swap.cursor,
            })
        }
    }

    /// Poll the chain until the last broadcast transaction leaves the pending state.
    ///
    /// There is no deadline. Watcher errors are logged and polling continues.
    pub async fn await_confirmation(
        &self,
        swap: &mut ActiveSwap,
    ) -> Result<ConfirmationOutcome, SwapError> {
        let Some(tx_hash) = swap.tx_hash else {
            return Ok(ConfirmationOutcome::Idle);
        };

        loop {
            match self.watcher.status(tx_hash).await {
                Ok(ConfirmationStatus::Confirmed) => break,
                Ok(ConfirmationStatus::Failed) => {
                    tracing::warn!(tx_hash = %tx_hash, "Swap transaction reverted");
                    return Err(SwapError::Confirmation(format!(
                        "transaction {tx_hash} reverted"
                    )));
                }
                Ok(ConfirmationStatus::Pending) => {}
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Confirmation poll failed");
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        swap.tx_hash = None;

        if swap.fully_submitted {
            counter!("swaps_completed_total").increment(1);
            tracing::info!(tx_hash = %tx_hash, plan = %swap.plan, "Swap completed");
            Ok(ConfirmationOutcome::Completed { tx_hash })
        } else {
            tracing::debug!(tx_hash = %tx_hash, "Swap step confirmed");
            Ok(ConfirmationOutcome::StepConfirmed { tx_hash })
        }
    }
}
