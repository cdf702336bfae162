use std::fmt;

use alloy::primitives::{Address, Bytes, U256};

/// One on-chain call of a swap plan, signed by the user's wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapStep {
    pub to: Address,
    /// ABI-encoded call payload.
    pub data: Bytes,
    /// Native value in wei.
    pub value: U256,
}

/// An ordered sequence of steps produced by the swap planner for one swap attempt.
///
/// Step 0 is conventionally a token approval; later steps perform the swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPlan {
    /// Symbol of the token being bought.
    pub token_symbol: String,
    /// Human-readable input amount as reported by the planner.
    pub amount: String,
    /// Action label, e.g. "swap".
    pub action: String,
    /// Chain the swap executes on.
    pub chain: String,
    pub steps: Vec<SwapStep>,
}

impl SwapPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether this plan trades into `symbol` (case-insensitive).
    pub fn trades_into(&self, symbol: &str) -> bool {
        self.token_symbol.eq_ignore_ascii_case(symbol.trim())
    }
}

impl fmt::Display for SwapPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} on {} ({} steps)",
            self.action,
            self.amount,
            self.token_symbol,
            self.chain,
            self.steps.len(),
        )
    }
}
