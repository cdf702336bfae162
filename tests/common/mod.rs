use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use maxxit::models::{Signal, SignalData, SwapPlan, SwapStep};
use maxxit::swap::{EntryPolicy, SigningFailure, StepExecutor, SwapCoordinator, SwapError, SwapPlanner};
use maxxit::wallet::{ChainWatcher, ConfirmationStatus, WalletSigner, WalletStatus};

pub const WALLET: &str = "0x00000000000000000000000000000000000000aa";

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("stub server has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

#[allow(dead_code)]
pub fn buy_signal(token: &str) -> Signal {
    Signal {
        id: format!("sig-{token}"),
        signal_data: SignalData {
            token: Some(token.into()),
            signal: Some("Buy".into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn arbitrum_wallet() -> WalletStatus {
    WalletStatus::connected(WALLET, 42161)
}

#[allow(dead_code)]
pub fn sample_plan(token: &str, steps: usize) -> SwapPlan {
    SwapPlan {
        token_symbol: token.into(),
        amount: "5".into(),
        action: "swap".into(),
        chain: "arbitrum".into(),
        steps: (0..steps)
            .map(|i| SwapStep {
                to: Address::from_str("0x1111111111111111111111111111111111111111").unwrap(),
                data: Bytes::from(vec![i as u8]),
                value: U256::from(i),
            })
            .collect(),
    }
}

fn tx_hash(n: usize) -> TxHash {
    TxHash::with_last_byte(n as u8 + 1)
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Returns scripted results, then succeeds with sequential hashes.
#[derive(Default)]
pub struct FakeSigner {
    script: Mutex<VecDeque<Result<TxHash, SigningFailure>>>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeSigner {
    pub fn failing_with(failure: SigningFailure) -> Self {
        Self::scripted(vec![Err(failure)])
    }

    pub fn scripted(results: Vec<Result<TxHash, SigningFailure>>) -> Self {
        let signer = Self::default();
        signer.script.lock().unwrap().extend(results);
        signer
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for FakeSigner {
    async fn send_transaction(&self, _step: &SwapStep) -> Result<TxHash, SigningFailure> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(tx_hash(n)))
    }
}

/// Replays scripted statuses, then reports every transaction as confirmed.
#[derive(Default)]
pub struct FakeWatcher {
    script: Mutex<VecDeque<ConfirmationStatus>>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeWatcher {
    pub fn scripted(statuses: &[ConfirmationStatus]) -> Self {
        let watcher = Self::default();
        watcher.script.lock().unwrap().extend(statuses.iter().copied());
        watcher
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainWatcher for FakeWatcher {
    async fn status(&self, _tx_hash: TxHash) -> anyhow::Result<ConfirmationStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConfirmationStatus::Confirmed))
    }
}

/// Always answers with the same plan or error, recording the amounts it saw.
pub struct FakePlanner {
    result: Result<SwapPlan, SwapError>,
    pub amounts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakePlanner {
    pub fn returning(result: Result<SwapPlan, SwapError>) -> Self {
        Self {
            result,
            amounts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.amounts.lock().unwrap().len()
    }
}

#[async_trait]
impl SwapPlanner for FakePlanner {
    async fn request_plan(
        &self,
        amount_text: &str,
        _signal: &Signal,
        _wallet_address: &str,
    ) -> Result<SwapPlan, SwapError> {
        self.amounts.lock().unwrap().push(amount_text.to_string());
        self.result.clone()
    }
}

/// A coordinator wired to the given fakes with a 1ms confirmation poll.
#[allow(dead_code)]
pub fn coordinator(
    planner: Arc<FakePlanner>,
    signer: Arc<FakeSigner>,
    watcher: Arc<FakeWatcher>,
) -> SwapCoordinator {
    let executor = StepExecutor::new(signer, watcher, Duration::from_millis(1));
    SwapCoordinator::new(planner, executor, EntryPolicy::default())
}
