use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use metrics::counter;
use tokio::sync::Mutex;

use crate::models::Signal;

use super::client::SignalsClient;
use super::normalize::normalize_signal;

/// What the consumer of the feed should currently display.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Failed(String),
    Ready(Vec<Signal>),
}

impl FeedState {
    pub fn signals(&self) -> &[Signal] {
        match self {
            FeedState::Ready(signals) => signals,
            _ => &[],
        }
    }
}

/// Holds the most recently loaded signal list.
///
/// Results that arrive after [`SignalFeed::unmount`] are dropped instead of
/// being written back, so a torn-down consumer never observes late data.
#[derive(Clone)]
pub struct SignalFeed {
    client: SignalsClient,
    state: Arc<Mutex<FeedState>>,
    mounted: Arc<AtomicBool>,
}

impl SignalFeed {
    pub fn new(client: SignalsClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(FeedState::Loading)),
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub async fn state(&self) -> FeedState {
        self.state.lock().await.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    /// Fetch the signals once and replace the held state. Never retries.
    pub async fn load(&self) {
        self.publish(FeedState::Loading).await;

        let next = match self.client.fetch_latest().await {
            Ok(records) => {
                let signals: Vec<Signal> = records.into_iter().map(normalize_signal).collect();
                counter!("signals_loaded_total").increment(signals.len() as u64);
                tracing::info!(count = signals.len(), "Signals loaded");
                FeedState::Ready(signals)
            }
            Err(e) => {
                tracing::warn!(error = %e, url = self.client.url(), "Failed to load signals");
                FeedState::Failed(e.to_string())
            }
        };

        self.publish(next).await;
    }

    async fn publish(&self, next: FeedState) {
        if !self.is_mounted() {
            tracing::debug!("Signal feed unmounted, discarding result");
            return;
        }
        *self.state.lock().await = next;
    }
}
