use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Signal;
use crate::wallet::WalletStatus;

use super::error::AmountError;

/// Why a swap could not be started for the selected signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryBlocked {
    #[error("Swaps are only available for buy signals")]
    NotBuySignal,

    #[error("Connect your wallet to trade")]
    ConnectWallet,

    #[error("Switch your wallet to chain {required} to trade")]
    SwitchNetwork { required: u64, current: Option<u64> },

    #[error("Finish or reject the pending {token} swap first")]
    PlanPending { token: String },
}

/// Preconditions for opening the amount prompt.
#[derive(Debug, Clone)]
pub struct EntryPolicy {
    /// Smallest input-token amount the planner is asked to swap.
    pub min_amount: Decimal,
    pub required_chain_id: u64,
}

impl Default for EntryPolicy {
    fn default() -> Self {
        Self {
            min_amount: Decimal::new(1, 3), // 0.001
            required_chain_id: 42161,
        }
    }
}

impl EntryPolicy {
    pub fn check(&self, signal: &Signal, wallet: &WalletStatus) -> Result<(), EntryBlocked> {
        if !signal.is_buy() {
            return Err(EntryBlocked::NotBuySignal);
        }
        if !wallet.is_connected() {
            return Err(EntryBlocked::ConnectWallet);
        }
        if wallet.chain_id != Some(self.required_chain_id) {
            return Err(EntryBlocked::SwitchNetwork {
                required: self.required_chain_id,
                current: wallet.chain_id,
            });
        }
        Ok(())
    }
}

/// An amount that passed validation, ready to be sent to the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedAmount {
    pub signal: Signal,
    /// The decimal text exactly as entered.
    pub amount_text: String,
    pub amount: Decimal,
}

/// The open amount prompt for one selected signal.
///
/// Existing value means "open"; confirming or cancelling drops it, which is
/// the closed state.
#[derive(Debug, Clone)]
pub struct AmountCollector {
    signal: Signal,
    input: String,
    min_amount: Decimal,
}

impl AmountCollector {
    pub fn open(
        policy: &EntryPolicy,
        signal: &Signal,
        wallet: &WalletStatus,
    ) -> Result<Self, EntryBlocked> {
        policy.check(signal, wallet)?;

        tracing::debug!(signal_id = %signal.id, token = signal.display_symbol(), "Amount prompt opened");

        Ok(Self {
            signal: signal.clone(),
            input: String::new(),
            min_amount: policy.min_amount,
        })
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn validate(&self) -> Result<Decimal, AmountError> {
        parse_amount(&self.input, self.min_amount)
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn confirm(&self) -> Result<ConfirmedAmount, AmountError> {
        let amount = self.validate()?;
        Ok(ConfirmedAmount {
            signal: self.signal.clone(),
            amount_text: self.input.trim().to_string(),
            amount,
        })
    }
}

/// Parse user input as a decimal amount of at least `min`.
pub fn parse_amount(text: &str, min: Decimal) -> Result<Decimal, AmountError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountError::NotNumeric);
    }

    let amount = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| AmountError::NotNumeric)?;

    if amount < min {
        return Err(AmountError::BelowMinimum { min });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignalData;

    fn buy_signal() -> Signal {
        Signal {
            id: "sig-1".into(),
            signal_data: SignalData {
                token: Some("ARB".into()),
                signal: Some("Buy".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn arbitrum_wallet() -> WalletStatus {
        WalletStatus::connected("0x00000000000000000000000000000000000000aa", 42161)
    }

    #[test]
    fn test_minimum_amount_boundary() {
        let min = Decimal::new(1, 3);
        assert!(parse_amount("0.001", min).is_ok());
        assert!(parse_amount("0.0010", min).is_ok());
        assert!(parse_amount("25", min).is_ok());
        assert_eq!(
            parse_amount("0.0009999", min),
            Err(AmountError::BelowMinimum { min })
        );
        assert_eq!(parse_amount("0.0005", min), Err(AmountError::BelowMinimum { min }));
        assert_eq!(parse_amount("-1", min), Err(AmountError::BelowMinimum { min }));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let min = Decimal::new(1, 3);
        assert_eq!(parse_amount("", min), Err(AmountError::NotNumeric));
        assert_eq!(parse_amount("abc", min), Err(AmountError::NotNumeric));
        assert_eq!(parse_amount("1.2.3", min), Err(AmountError::NotNumeric));
    }

    #[test]
    fn test_open_requires_buy_signal() {
        let mut signal = buy_signal();
        signal.signal_data.signal = Some("Sell".into());
        let result = AmountCollector::open(&EntryPolicy::default(), &signal, &arbitrum_wallet());
        assert!(matches!(result, Err(EntryBlocked::NotBuySignal)));
    }

    #[test]
    fn test_open_requires_wallet_and_chain() {
        let policy = EntryPolicy::default();

        let result = AmountCollector::open(&policy, &buy_signal(), &WalletStatus::disconnected());
        assert!(matches!(result, Err(EntryBlocked::ConnectWallet)));

        let wrong_chain = WalletStatus::connected("0x00000000000000000000000000000000000000aa", 1);
        let result = AmountCollector::open(&policy, &buy_signal(), &wrong_chain);
        assert_eq!(
            result.unwrap_err(),
            EntryBlocked::SwitchNetwork {
                required: 42161,
                current: Some(1)
            }
        );
    }

    #[test]
    fn test_confirm_keeps_literal_text() {
        let mut collector =
            AmountCollector::open(&EntryPolicy::default(), &buy_signal(), &arbitrum_wallet()).unwrap();
        assert!(!collector.can_submit());

        collector.set_input(" 2.50 ");
        assert!(collector.can_submit());

        let confirmed = collector.confirm().unwrap();
        assert_eq!(confirmed.amount_text, "2.50");
        assert_eq!(confirmed.amount, Decimal::new(25, 1));
        assert_eq!(confirmed.signal.id, "sig-1");
    }
}
