use std::str::FromStr;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::models::{Signal, SwapPlan, SwapStep};

use super::error::{AmountError, PlannerFailure, SwapError};

/// Produces a [`SwapPlan`] for swapping `amount_text` of the input token into
/// the signal's token.
#[async_trait]
pub trait SwapPlanner: Send + Sync {
    async fn request_plan(
        &self,
        amount_text: &str,
        signal: &Signal,
        wallet_address: &str,
    ) -> Result<SwapPlan, SwapError>;
}

/// Wording of the natural-language instruction sent to the planning agent.
#[derive(Debug, Clone)]
pub struct InstructionTemplate {
    /// Token the user pays with.
    pub input_symbol: String,
    /// Target used when the signal names no token.
    pub fallback_symbol: String,
    /// Chain both legs of the swap run on.
    pub chain_name: String,
}

impl Default for InstructionTemplate {
    fn default() -> Self {
        Self {
            input_symbol: "USDC".into(),
            fallback_symbol: "ARB".into(),
            chain_name: "arbitrum".into(),
        }
    }
}

impl InstructionTemplate {
    pub fn target_symbol(&self, signal: &Signal) -> String {
        signal
            .token_symbol()
            .map(str::to_uppercase)
            .unwrap_or_else(|| self.fallback_symbol.clone())
    }

    /// Input amounts are rendered with the input token's 6 decimals.
    pub fn render(&self, amount: Decimal, target_symbol: &str) -> String {
        format!(
            "Swap {:.6} {} to {} token on {} network from {} network",
            amount.round_dp(6),
            self.input_symbol,
            target_symbol,
            self.chain_name,
            self.chain_name,
        )
    }
}

/// Body accepted by the swap relay boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub instruction: String,
    pub user_address: String,
}

/// Requests swap plans from the planning agent through the local relay.
#[derive(Debug, Clone)]
pub struct PlanRequester {
    http: Client,
    relay_url: String,
    template: InstructionTemplate,
}

impl PlanRequester {
    pub fn new(http: Client, relay_url: impl Into<String>, template: InstructionTemplate) -> Self {
        Self {
            http,
            relay_url: relay_url.into(),
            template,
        }
    }

    pub fn template(&self) -> &InstructionTemplate {
        &self.template
    }

    async fn post(&self, request: &RelayRequest) -> Result<Value, SwapError> {
        let resp = self
            .http
            .post(&self.relay_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Swap relay unreachable");
                SwapError::Network("could not reach the swap agent".into())
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Swap relay returned non-2xx");
            return Err(SwapError::Network(format!(
                "swap agent request failed with status {status}"
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| SwapError::DataShape(format!("response is not JSON: {e}")))
    }
}

#[async_trait]
impl SwapPlanner for PlanRequester {
    async fn request_plan(
        &self,
        amount_text: &str,
        signal: &Signal,
        wallet_address: &str,
    ) -> Result<SwapPlan, SwapError> {
        let amount = Decimal::from_str(amount_text.trim())
            .map_err(|_| SwapError::Amount(AmountError::NotNumeric))?;
        let target = self.template.target_symbol(signal);
        let request = RelayRequest {
            instruction: self.template.render(amount, &target),
            user_address: wallet_address.to_string(),
        };

        counter!("swap_plans_requested_total").increment(1);
        tracing::info!(
            signal_id = %signal.id,
            target = %target,
            amount = %amount,
            "Requesting swap plan"
        );

        let result = self
            .post(&request)
            .await
            .and_then(|body| interpret_plan_response(&body, &target, amount_text, &self.template.chain_name));

        match &result {
            Ok(plan) => tracing::info!(plan = %plan, "Swap plan received"),
            Err(e) => {
                counter!("swap_plans_failed_total").increment(1);
                tracing::warn!(error = %e, target = %target, "Swap plan request failed");
            }
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Response interpretation
// ---------------------------------------------------------------------------

/// Turn a planner response body into a plan or the error to show.
///
/// `target_symbol`, `amount_text` and `chain` fill in preview fields the
/// planner leaves out.
pub fn interpret_plan_response(
    body: &Value,
    target_symbol: &str,
    amount_text: &str,
    chain: &str,
) -> Result<SwapPlan, SwapError> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        let reason = text_at(body, &["error", "message"]).unwrap_or_else(|| "Unknown error".into());
        return Err(SwapError::Api(reason));
    }

    let data = body
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| SwapError::DataShape("missing data".into()))?;

    let state = data.pointer("/status/state").and_then(Value::as_str);
    if state != Some("completed") {
        return Err(SwapError::Planner(planner_failure(data, state)));
    }

    let artifact = data
        .pointer("/artifacts/0/parts/0/data")
        .filter(|a| a.is_object())
        .ok_or_else(|| SwapError::DataShape("missing artifact".into()))?;

    let preview = artifact
        .get("txPreview")
        .filter(|p| p.is_object())
        .ok_or_else(|| SwapError::DataShape("missing transaction preview".into()))?;

    let raw_steps = artifact
        .get("txPlan")
        .and_then(Value::as_array)
        .filter(|steps| !steps.is_empty())
        .ok_or_else(|| SwapError::DataShape("missing transaction plan".into()))?;

    let steps = raw_steps
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_step(i, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SwapPlan {
        token_symbol: text_at(preview, &["toTokenSymbol", "tokenOutSymbol", "toToken"])
            .unwrap_or_else(|| target_symbol.to_string()),
        amount: text_at(preview, &["fromTokenAmount", "amount"])
            .unwrap_or_else(|| amount_text.to_string()),
        action: text_at(preview, &["action"]).unwrap_or_else(|| "swap".into()),
        chain: text_at(preview, &["toChain", "toChainId", "chainId"])
            .unwrap_or_else(|| chain.to_string()),
        steps,
    })
}

/// A structured code wins over the reason text when the planner sends one.
fn planner_failure(data: &Value, state: Option<&str>) -> PlannerFailure {
    let code = data
        .pointer("/status/code")
        .or_else(|| data.pointer("/error/code"))
        .and_then(Value::as_str);
    if let Some(known) = code.and_then(PlannerFailure::from_code) {
        return known;
    }

    let message = data.pointer("/status/message").and_then(message_text);
    let context = data.get("contextId").and_then(Value::as_str);

    for candidate in [message.as_deref(), context].into_iter().flatten() {
        if let Some(known) = PlannerFailure::from_code(candidate) {
            return known;
        }
    }

    let reason = message
        .or_else(|| state.map(|s| format!("planner state {s}")))
        .unwrap_or_else(|| "unknown planner state".into());
    PlannerFailure::Other(reason)
}

/// Status messages are plain strings or agent messages with text parts.
fn message_text(message: &Value) -> Option<String> {
    if let Some(text) = message.as_str() {
        return Some(text.to_string());
    }

    let parts: Vec<&str> = message
        .get("parts")?
        .as_array()?
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn parse_step(index: usize, raw: &Value) -> Result<SwapStep, SwapError> {
    let shape = |what: &str| SwapError::DataShape(format!("step {index}: {what}"));

    let to = raw
        .get("to")
        .and_then(Value::as_str)
        .and_then(|s| Address::from_str(s).ok())
        .ok_or_else(|| shape("invalid destination address"))?;

    let data = match raw.get("data") {
        None | Some(Value::Null) => Bytes::new(),
        Some(Value::String(hex)) => Bytes::from_str(hex).map_err(|_| shape("invalid call data"))?,
        Some(_) => return Err(shape("invalid call data")),
    };

    let value = match raw.get("value") {
        None | Some(Value::Null) => U256::ZERO,
        Some(Value::String(s)) if s.is_empty() => U256::ZERO,
        Some(Value::String(s)) => U256::from_str(s).map_err(|_| shape("invalid value"))?,
        Some(Value::Number(n)) => U256::from_str(&n.to_string()).map_err(|_| shape("invalid value"))?,
        Some(_) => return Err(shape("invalid value")),
    };

    Ok(SwapStep { to, data, value })
}

/// First present key rendered as text; objects contribute their `symbol`.
fn text_at(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => obj.get("symbol").and_then(Value::as_str).map(str::to_string),
        _ => None,
    })
}
