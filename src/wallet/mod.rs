pub mod rpc;

pub use rpc::{JsonRpcClient, RpcError, RpcReceiptWatcher, RpcWalletSigner};

use alloy::primitives::TxHash;
use async_trait::async_trait;

use crate::models::SwapStep;
use crate::swap::SigningFailure;

/// Connection state of the user's wallet as reported by the wallet SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletStatus {
    pub address: Option<String>,
    pub chain_id: Option<u64>,
}

impl WalletStatus {
    pub fn connected(address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            address: Some(address.into()),
            chain_id: Some(chain_id),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// On-chain state of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Asks the user's wallet to sign and broadcast one swap step.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn send_transaction(&self, step: &SwapStep) -> Result<TxHash, SigningFailure>;
}

/// Reports whether a broadcast transaction has been mined.
#[async_trait]
pub trait ChainWatcher: Send + Sync {
    async fn status(&self, tx_hash: TxHash) -> anyhow::Result<ConfirmationStatus>;
}
