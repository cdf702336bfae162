use std::env;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::signals::{SignalFeed, SignalsClient};
use crate::swap::{EntryPolicy, InstructionTemplate, PlanRequester, SwapError};
use crate::wallet::JsonRpcClient;

const DEFAULT_SWAP_AGENT_URL: &str = "https://swapping-agent.xcan.dev/agent";
const ARBITRUM_ONE_CHAIN_ID: u64 = 42161;

/// Settings for the relay service binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Upstream planning agent the relay forwards to.
    pub swap_agent_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            swap_agent_url: env::var("SWAP_AGENT_URL")
                .unwrap_or_else(|_| DEFAULT_SWAP_AGENT_URL.into()),
        })
    }
}

/// Settings for the signal feed and the swap flow.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub signals_api_url: String,
    pub swap_relay_url: String,
    /// Wallet-backed JSON-RPC endpoint used for signing and receipts.
    pub wallet_rpc_url: Option<String>,
    pub fallback_token_symbol: String,
    pub input_token_symbol: String,
    pub chain_name: String,
    pub required_chain_id: u64,
    pub min_swap_amount: Decimal,
    pub confirmation_poll_interval: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, SwapError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any variable source. Both endpoints are required.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, SwapError> {
        let required = |key: &str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SwapError::Config(format!("{key} must be set")))
        };

        Ok(Self {
            signals_api_url: required("SIGNALS_API_URL")?,
            swap_relay_url: required("SWAP_RELAY_URL")?,
            wallet_rpc_url: var("WALLET_RPC_URL").filter(|v| !v.is_empty()),
            fallback_token_symbol: var("FALLBACK_TOKEN_SYMBOL").unwrap_or_else(|| "ARB".into()),
            input_token_symbol: var("INPUT_TOKEN_SYMBOL").unwrap_or_else(|| "USDC".into()),
            chain_name: var("SWAP_CHAIN_NAME").unwrap_or_else(|| "arbitrum".into()),
            required_chain_id: var("REQUIRED_CHAIN_ID")
                .and_then(|v| v.parse().ok())
                .unwrap_or(ARBITRUM_ONE_CHAIN_ID),
            min_swap_amount: var("MIN_SWAP_AMOUNT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(Decimal::new(1, 3)),
            confirmation_poll_interval: Duration::from_millis(
                var("CONFIRMATION_POLL_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2_000),
            ),
        })
    }

    pub fn entry_policy(&self) -> EntryPolicy {
        EntryPolicy {
            min_amount: self.min_swap_amount,
            required_chain_id: self.required_chain_id,
        }
    }

    pub fn instruction_template(&self) -> InstructionTemplate {
        InstructionTemplate {
            input_symbol: self.input_token_symbol.clone(),
            fallback_symbol: self.fallback_token_symbol.clone(),
            chain_name: self.chain_name.clone(),
        }
    }

    pub fn signal_feed(&self, http: reqwest::Client) -> SignalFeed {
        SignalFeed::new(SignalsClient::new(http, self.signals_api_url.clone()))
    }

    pub fn plan_requester(&self, http: reqwest::Client) -> PlanRequester {
        PlanRequester::new(http, self.swap_relay_url.clone(), self.instruction_template())
    }

    pub fn wallet_rpc(&self, http: reqwest::Client) -> Option<JsonRpcClient> {
        self.wallet_rpc_url
            .as_ref()
            .map(|url| JsonRpcClient::new(http, url.clone()))
    }
}
