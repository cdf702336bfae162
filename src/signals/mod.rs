pub mod client;
pub mod feed;
pub mod normalize;

pub use client::{SignalsClient, SignalsClientError, SignalsEnvelope};
pub use feed::{FeedState, SignalFeed};
pub use normalize::{normalize_signal, unwrap_extended_json};
