use alloy::primitives::TxHash;
use rust_decimal::Decimal;
use thiserror::Error;

/// Every way a swap attempt can fail. The `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The relay or planner returned an explicit failure envelope.
    #[error("API error: {0}")]
    Api(String),

    /// A success envelope that is missing the fields a plan is built from.
    #[error("Unexpected response from swap agent: {0}")]
    DataShape(String),

    #[error(transparent)]
    Planner(#[from] PlannerFailure),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Signing(#[from] SigningFailure),

    #[error("Transaction confirmation failed: {0}")]
    Confirmation(String),

    #[error("No active swap")]
    NoActiveSwap,

    #[error("All swap steps have already been submitted")]
    NothingToApprove,

    /// The previous step's transaction has not been mined yet.
    #[error("Waiting for transaction {0} to confirm")]
    AwaitingConfirmation(TxHash),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Enter a valid amount")]
    NotNumeric,

    #[error("Minimum amount is {min}")]
    BelowMinimum { min: Decimal },
}

/// Reasons reported by the swap planner for a plan it could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerFailure {
    #[error("Insufficient balance: the amount entered is more than your wallet holds. Check your balance and try a smaller amount.")]
    InsufficientBalance,

    #[error("Invalid amount: the swap agent could not use the amount entered. Try a different amount.")]
    InvalidAmount,

    #[error("This token is not supported for swapping yet.")]
    UnsupportedToken,

    #[error("Network error while planning the swap. Please try again.")]
    Network,

    #[error("Too many requests to the swap agent. Please wait a moment and try again.")]
    RateLimited,

    #[error("Swap failed: {0}")]
    Other(String),
}

impl PlannerFailure {
    /// Map a structured failure code such as `INSUFFICIENT_BALANCE`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::match_known(code)
    }

    /// Classify a free-text failure reason, falling back to [`PlannerFailure::Other`].
    pub fn classify(reason: &str) -> Self {
        Self::match_known(reason).unwrap_or_else(|| PlannerFailure::Other(reason.to_string()))
    }

    fn match_known(text: &str) -> Option<Self> {
        let text = fold(text);
        if text.contains("insufficient balance") {
            Some(PlannerFailure::InsufficientBalance)
        } else if text.contains("invalid amount") {
            Some(PlannerFailure::InvalidAmount)
        } else if text.contains("unsupported token") {
            Some(PlannerFailure::UnsupportedToken)
        } else if text.contains("network error") {
            Some(PlannerFailure::Network)
        } else if text.contains("rate limit") {
            Some(PlannerFailure::RateLimited)
        } else {
            None
        }
    }
}

/// Failures reported by the wallet while signing or sending a step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningFailure {
    #[error("Transaction rejected in wallet. Swap cancelled.")]
    Rejected,

    #[error("Insufficient funds to cover this transaction and its gas fee.")]
    InsufficientFunds,

    #[error("Network error while sending the transaction. Please try again.")]
    Network,

    #[error("{0}")]
    Other(String),
}

impl SigningFailure {
    pub fn classify(message: &str) -> Self {
        let text = fold(message);
        if text.contains("insufficient funds") {
            SigningFailure::InsufficientFunds
        } else if text.contains("user rejected")
            || text.contains("user denied")
            || text.contains("rejected by user")
        {
            SigningFailure::Rejected
        } else if text.contains("network") {
            SigningFailure::Network
        } else {
            SigningFailure::Other(message.to_string())
        }
    }
}

/// Lowercase and treat `-`/`_` as spaces so codes and prose compare alike.
fn fold(text: &str) -> String {
    text.to_lowercase().replace(['-', '_'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_reason_classification() {
        assert_eq!(
            PlannerFailure::classify("ctx-insufficient-balance-42"),
            PlannerFailure::InsufficientBalance
        );
        assert_eq!(
            PlannerFailure::classify("Invalid amount supplied"),
            PlannerFailure::InvalidAmount
        );
        assert_eq!(
            PlannerFailure::classify("unsupported_token"),
            PlannerFailure::UnsupportedToken
        );
        assert_eq!(PlannerFailure::classify("RATE_LIMIT hit"), PlannerFailure::RateLimited);
        assert_eq!(
            PlannerFailure::classify("route not found"),
            PlannerFailure::Other("route not found".into())
        );
        assert_eq!(
            PlannerFailure::classify("route not found").to_string(),
            "Swap failed: route not found"
        );
    }

    #[test]
    fn test_structured_code() {
        assert_eq!(
            PlannerFailure::from_code("INSUFFICIENT_BALANCE"),
            Some(PlannerFailure::InsufficientBalance)
        );
        assert_eq!(PlannerFailure::from_code("E_UNKNOWN"), None);
    }

    #[test]
    fn test_signing_classification() {
        assert_eq!(SigningFailure::classify("User rejected the request."), SigningFailure::Rejected);
        assert_eq!(
            SigningFailure::classify("insufficient funds for gas * price + value"),
            SigningFailure::InsufficientFunds
        );
        assert_eq!(SigningFailure::classify("network timeout"), SigningFailure::Network);
        assert_eq!(
            SigningFailure::classify("nonce too low"),
            SigningFailure::Other("nonce too low".into())
        );
        assert_eq!(SigningFailure::classify("MetaMask Tx Signature: User denied transaction signature."), SigningFailure::Rejected);
        assert_eq!(SigningFailure::classify("Request rejected by user"), SigningFailure::Rejected);
    }

    #[test]
    fn test_node_side_rejection_is_not_a_cancellation() {
        let reason = "transaction rejected: nonce too low";
        assert_eq!(SigningFailure::classify(reason), SigningFailure::Other(reason.into()));
    }
}
