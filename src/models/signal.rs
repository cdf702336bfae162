use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::SignalDirection;

/// A trading signal as delivered by the signals read API, after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Signal {
    /// Document identifier; empty when the source record carried none.
    pub id: String,
    /// Identifier of the post the signal was derived from.
    pub tweet_id: Option<String>,
    pub twitter_handle: Option<String>,
    pub coin: Option<String>,
    pub signal_message: Option<String>,
    pub signal_data: SignalData,
    pub generated_at: Option<DateTime<Utc>>,
    pub subscribers: Vec<Subscriber>,
    pub tweet_link: Option<String>,
    pub message_sent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalData {
    pub token: Option<String>,
    /// Raw direction text ("Buy", "Sell", ...).
    pub signal: Option<String>,
    pub current_price: Option<Decimal>,
    /// Price at the time of the originating post, used as the entry price.
    pub price_at_tweet: Option<Decimal>,
    pub targets: Vec<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub timeline: Option<String>,
    pub max_exit_time: Option<String>,
    pub trade_tip: Option<String>,
    pub tweet_link: Option<String>,
    pub token_mentioned: Option<String>,
    pub token_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    pub username: String,
    pub sent: bool,
}

/// Profit and loss of a signal relative to its entry price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pnl {
    pub percentage: Decimal,
    pub absolute: Decimal,
    pub is_profit: bool,
}

impl Pnl {
    pub const ZERO: Pnl = Pnl {
        percentage: Decimal::ZERO,
        absolute: Decimal::ZERO,
        is_profit: false,
    };
}

impl Signal {
    pub fn direction(&self) -> SignalDirection {
        self.signal_data
            .signal
            .as_deref()
            .map(SignalDirection::from_api_str)
            .unwrap_or(SignalDirection::Neutral)
    }

    pub fn is_buy(&self) -> bool {
        self.direction() == SignalDirection::Buy
    }

    /// Token the signal is about: the explicit token, then the coin.
    pub fn token_symbol(&self) -> Option<&str> {
        non_blank(&self.signal_data.token).or_else(|| non_blank(&self.coin))
    }

    pub fn display_symbol(&self) -> &str {
        self.token_symbol().unwrap_or("Unknown")
    }

    pub fn pnl(&self) -> Pnl {
        calculate_pnl(
            self.signal_data.current_price,
            self.signal_data.price_at_tweet,
            self.signal_data.signal.as_deref(),
        )
    }

    /// Coarse age of the signal: "2d ago", "5h ago", "< 1h ago", or "-" when unknown.
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let Some(generated_at) = self.generated_at else {
            return "-".into();
        };

        let hours = (now - generated_at).num_hours();
        let days = hours / 24;

        if days > 0 {
            format!("{days}d ago")
        } else if hours > 0 {
            format!("{hours}h ago")
        } else {
            "< 1h ago".into()
        }
    }
}

/// PnL of a position opened at `entry` and marked at `current`.
///
/// Buy signals profit when the price rises; every other direction is treated
/// as short. Missing or zero prices, or a missing direction, yield zeros.
fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn calculate_pnl(
    current: Option<Decimal>,
    entry: Option<Decimal>,
    direction: Option<&str>,
) -> Pnl {
    let (Some(current), Some(entry), Some(direction)) = (current, entry, direction) else {
        return Pnl::ZERO;
    };
    if current.is_zero() || entry.is_zero() || direction.is_empty() {
        return Pnl::ZERO;
    }

    let multiplier = if SignalDirection::from_api_str(direction) == SignalDirection::Buy {
        Decimal::ONE
    } else {
        Decimal::NEGATIVE_ONE
    };
    let absolute = (current - entry) * multiplier;
    let percentage = absolute / entry * Decimal::ONE_HUNDRED;

    Pnl {
        percentage,
        absolute,
        is_profit: absolute > Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_buy_pnl_in_profit() {
        let pnl = calculate_pnl(
            Some(Decimal::new(11, 1)),
            Some(Decimal::ONE),
            Some("Buy"),
        );
        assert_eq!(pnl.percentage, Decimal::from(10));
        assert_eq!(pnl.absolute, Decimal::new(1, 1));
        assert!(pnl.is_profit);
    }

    #[test]
    fn test_sell_pnl_inverts() {
        let pnl = calculate_pnl(
            Some(Decimal::new(11, 1)),
            Some(Decimal::ONE),
            Some("sell"),
        );
        assert_eq!(pnl.percentage, Decimal::from(-10));
        assert!(!pnl.is_profit);
    }

    #[test]
    fn test_pnl_missing_inputs_are_zero() {
        assert_eq!(calculate_pnl(None, Some(Decimal::ONE), Some("Buy")), Pnl::ZERO);
        assert_eq!(calculate_pnl(Some(Decimal::ONE), Some(Decimal::ZERO), Some("Buy")), Pnl::ZERO);
        assert_eq!(calculate_pnl(Some(Decimal::ONE), Some(Decimal::TWO), None), Pnl::ZERO);
    }

    #[test]
    fn test_token_symbol_prefers_token_over_coin() {
        let mut signal = Signal {
            coin: Some("bitcoin".into()),
            ..Default::default()
        };
        assert_eq!(signal.token_symbol(), Some("bitcoin"));

        signal.signal_data.token = Some("BTC".into());
        assert_eq!(signal.token_symbol(), Some("BTC"));

        signal.signal_data.token = Some("  ".into());
        assert_eq!(signal.token_symbol(), Some("bitcoin"));

        signal.coin = Some(" pepe ".into());
        assert_eq!(signal.display_symbol(), "pepe");
        assert_eq!(Signal::default().display_symbol(), "Unknown");
    }

    #[test]
    fn test_age_label() {
        let now = Utc::now();
        let mut signal = Signal::default();
        assert_eq!(signal.age_label(now), "-");

        signal.generated_at = Some(now - Duration::minutes(30));
        assert_eq!(signal.age_label(now), "< 1h ago");

        signal.generated_at = Some(now - Duration::hours(5));
        assert_eq!(signal.age_label(now), "5h ago");

        signal.generated_at = Some(now - Duration::hours(50));
        assert_eq!(signal.age_label(now), "2d ago");
    }
}
