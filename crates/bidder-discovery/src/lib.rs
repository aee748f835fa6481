//! New-header discovery for the bidder.
//!
//! The bidder reacts to every new block header delivered over a websocket
//! subscription. This crate owns that subscription: dialing the websocket
//! endpoint until it answers, subscribing to new heads, and re-establishing
//! both when the stream dies.

use async_trait::async_trait;
use bidder_delivery::ChainReader;
use bidder_types::ChainHeader;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

pub mod subscription;

/// Re-export implementations
pub mod implementations {
	pub mod ws;
}

pub use implementations::ws::WsConnector;
pub use subscription::{HeaderSubscriber, Subscription};

/// Stream of new headers. Ends when the underlying subscription fails.
pub type HeaderStream = Pin<Box<dyn Stream<Item = ChainHeader> + Send>>;

/// Errors that can occur while establishing a header subscription.
#[derive(Debug, Error)]
pub enum SubscriptionError {
	#[error("Connection error: {0}")]
	Connection(String),
	#[error("Subscribe error: {0}")]
	Subscribe(String),
}

/// Chain handle that can also stream new headers.
#[async_trait]
pub trait HeaderSource: ChainReader {
	async fn subscribe_headers(&self) -> Result<HeaderStream, SubscriptionError>;
}

/// Produces subscribable chain handles.
#[async_trait]
pub trait ChainConnector: Send + Sync {
	async fn connect(&self, endpoint: &str) -> Result<Arc<dyn HeaderSource>, SubscriptionError>;
}
