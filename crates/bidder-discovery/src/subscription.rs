//! Subscription lifecycle: connect, subscribe, resubscribe.

use crate::{ChainConnector, HeaderSource, HeaderStream, SubscriptionError};
use bidder_types::{mask_endpoint, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// A live header stream and the chain handle that produced it.
pub struct Subscription {
	pub chain: Arc<dyn HeaderSource>,
	pub headers: HeaderStream,
}

/// Keeps a header subscription to one websocket endpoint alive.
pub struct HeaderSubscriber<C> {
	connector: C,
	endpoint: String,
	reconnect_delay: Duration,
	resubscribe: RetryPolicy,
}

impl<C: ChainConnector> HeaderSubscriber<C> {
	/// Dials forever with a fixed `reconnect_delay`; resubscribes up to
	/// `resubscribe_attempts` times, `resubscribe_delay` apart.
	pub fn new(
		connector: C,
		endpoint: impl Into<String>,
		reconnect_delay: Duration,
		resubscribe_attempts: u32,
		resubscribe_delay: Duration,
	) -> Self {
		Self {
			connector,
			endpoint: endpoint.into(),
			reconnect_delay,
			resubscribe: RetryPolicy::fixed(resubscribe_attempts, resubscribe_delay),
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// Dials the endpoint until it answers. Never gives up.
	pub async fn connect_subscribable(&self) -> Arc<dyn HeaderSource> {
		let masked = mask_endpoint(&self.endpoint);
		let mut attempt: u32 = 0;
		loop {
			match self.connector.connect(&self.endpoint).await {
				Ok(chain) => {
					info!(endpoint = %masked, "Connected to websocket endpoint");
					return chain;
				},
				Err(e) => {
					attempt = attempt.saturating_add(1);
					warn!(
						endpoint = %masked,
						attempt,
						error = %e,
						"Failed to connect to websocket endpoint"
					);
					tokio::time::sleep(self.reconnect_delay).await;
				},
			}
		}
	}

	/// Connects and subscribes once. A failed subscribe is returned to the
	/// caller; only the dial is retried.
	pub async fn subscribe(&self) -> Result<Subscription, SubscriptionError> {
		let chain = self.connect_subscribable().await;
		let headers = chain.subscribe_headers().await?;
		info!("Subscribed to new headers");
		Ok(Subscription { chain, headers })
	}

	/// Re-establishes the subscription after it failed.
	///
	/// Each attempt dials afresh and then subscribes. Returns `None` once
	/// the attempt budget is spent.
	pub async fn resubscribe(&self) -> Option<Subscription> {
		let outcome = self
			.resubscribe
			.run(|attempt| async move {
				let chain = self.connect_subscribable().await;
				match chain.subscribe_headers().await {
					Ok(headers) => Ok(Subscription { chain, headers }),
					Err(e) => {
						warn!(attempt = attempt + 1, error = %e, "Failed to resubscribe to new headers");
						Err(e)
					},
				}
			})
			.await;

		match outcome {
			Ok(subscription) => {
				info!("Resubscribed to new headers");
				Some(subscription)
			},
			Err(exhausted) => {
				error!(
					attempts = exhausted.attempts,
					error = %exhausted.last_error,
					"Failed to resubscribe to new headers"
				);
				None
			},
		}
	}
}
