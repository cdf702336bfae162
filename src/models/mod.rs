pub mod signal;
pub mod swap;

pub use signal::{calculate_pnl, Pnl, Signal, SignalData, Subscriber};
pub use swap::{SwapPlan, SwapStep};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SignalDirection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Buy,
    Sell,
    Neutral,
}

impl SignalDirection {
    /// Anything other than buy/sell (including "Hold" or an empty string) is neutral.
    pub fn from_api_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "buy" => SignalDirection::Buy,
            "sell" => SignalDirection::Sell,
            _ => SignalDirection::Neutral,
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Buy => write!(f, "BUY"),
            SignalDirection::Sell => write!(f, "SELL"),
            SignalDirection::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_case_insensitive() {
        assert_eq!(SignalDirection::from_api_str("Buy"), SignalDirection::Buy);
        assert_eq!(SignalDirection::from_api_str(" SELL "), SignalDirection::Sell);
        assert_eq!(SignalDirection::from_api_str("hold"), SignalDirection::Neutral);
        assert_eq!(SignalDirection::from_api_str(""), SignalDirection::Neutral);
    }
}
