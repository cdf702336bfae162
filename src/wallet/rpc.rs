use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::SwapStep;
use crate::swap::SigningFailure;

use super::{ChainWatcher, ConfirmationStatus, WalletSigner};

/// EIP-1193 "user rejected request".
const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Minimal JSON-RPC 2.0 client over HTTP.
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    http: Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let reply: Value = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = reply.get("error").filter(|e| !e.is_null()) {
            let err: RpcErrorBody = serde_json::from_value(err.clone())
                .map_err(|e| RpcError::Unexpected(format!("malformed error object: {e}")))?;
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        // A `null` result is meaningful (e.g. no receipt yet); a missing one is not.
        reply
            .get("result")
            .cloned()
            .ok_or_else(|| RpcError::Unexpected(format!("reply has neither result nor error: {reply}")))
    }
}

/// Sends swap steps through `eth_sendTransaction` on a wallet-backed RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcWalletSigner {
    rpc: JsonRpcClient,
    from: Address,
}

impl RpcWalletSigner {
    pub fn new(rpc: JsonRpcClient, from: Address) -> Self {
        Self { rpc, from }
    }
}

#[async_trait]
impl WalletSigner for RpcWalletSigner {
    async fn send_transaction(&self, step: &SwapStep) -> Result<TxHash, SigningFailure> {
        let tx = json!({
            "from": self.from.to_string(),
            "to": step.to.to_string(),
            "data": step.data.to_string(),
            "value": format!("0x{:x}", step.value),
        });

        let result = self
            .rpc
            .call("eth_sendTransaction", json!([tx]))
            .await
            .map_err(signing_failure)?;

        let hash = result
            .as_str()
            .ok_or_else(|| SigningFailure::Other(format!("wallet returned no transaction hash: {result}")))?;

        TxHash::from_str(hash)
            .map_err(|e| SigningFailure::Other(format!("invalid transaction hash {hash}: {e}")))
    }
}

fn signing_failure(err: RpcError) -> SigningFailure {
    match err {
        RpcError::Rpc { code, .. } if code == USER_REJECTED_CODE => SigningFailure::Rejected,
        RpcError::Rpc { message, .. } => SigningFailure::classify(&message),
        RpcError::Http(e) => {
            tracing::warn!(error = %e, "Wallet RPC unreachable");
            SigningFailure::Network
        }
        RpcError::Unexpected(message) => SigningFailure::Other(message),
    }
}

/// Polls `eth_getTransactionReceipt` for confirmation status.
#[derive(Debug, Clone)]
pub struct RpcReceiptWatcher {
    rpc: JsonRpcClient,
}

impl RpcReceiptWatcher {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl ChainWatcher for RpcReceiptWatcher {
    async fn status(&self, tx_hash: TxHash) -> anyhow::Result<ConfirmationStatus> {
        let receipt = self
            .rpc
            .call("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await?;
        Ok(receipt_status(&receipt))
    }
}

/// A missing receipt is still pending; receipts without a status field predate
/// Byzantium and count as confirmed.
fn receipt_status(receipt: &Value) -> ConfirmationStatus {
    if receipt.is_null() {
        return ConfirmationStatus::Pending;
    }

    match receipt.get("status").and_then(Value::as_str) {
        Some("0x0") => ConfirmationStatus::Failed,
        _ => ConfirmationStatus::Confirmed,
    }
}
