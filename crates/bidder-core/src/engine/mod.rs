//! Bidder engine driving one header at a time through the bid pipeline.
//!
//! The loop waits for the next header, hands it to the [`HeaderHandler`] and
//! only then listens again. A dead subscription is re-established through the
//! [`HeaderSubscriber`]; when that gives up the engine stops with an error.
//! A configured run duration and the shutdown future both end the loop
//! cleanly between headers.

use crate::handlers::HeaderHandler;
use bidder_config::Config;
use bidder_discovery::{ChainConnector, HeaderSubscriber, Subscription};
use bidder_types::mask_endpoint;
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Errors that end the engine loop.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Header subscription lost after {attempts} resubscribe attempts")]
	SubscriptionLost { attempts: u32 },
}

/// Why the loop stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
	Shutdown,
	DeadlineElapsed,
}

/// Counters reported when the engine stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
	pub headers_processed: u64,
	pub bids_submitted: u64,
	pub failures: u64,
	pub resubscriptions: u64,
	pub stop_reason: StopReason,
}

/// Main bidder engine.
pub struct BidderEngine<C> {
	config: Arc<Config>,
	handler: HeaderHandler,
	subscriber: HeaderSubscriber<C>,
	subscription: Subscription,
}

impl<C: ChainConnector> BidderEngine<C> {
	pub fn new(
		config: Arc<Config>,
		handler: HeaderHandler,
		subscriber: HeaderSubscriber<C>,
		subscription: Subscription,
	) -> Self {
		Self {
			config,
			handler,
			subscriber,
			subscription,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Runs until Ctrl-C, the run duration or subscription exhaustion.
	pub async fn run(self) -> Result<RunSummary, EngineError> {
		self.run_until(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				error!(error = %e, "Failed to listen for shutdown signal");
				std::future::pending::<()>().await;
			}
		})
		.await
	}

	/// Runs until `shutdown` resolves, the run duration elapses or the
	/// subscription cannot be re-established.
	pub async fn run_until<F>(mut self, shutdown: F) -> Result<RunSummary, EngineError>
	where
		F: Future<Output = ()>,
	{
		let deadline = self.config.bidder.run_duration().and_then(|duration| {
			let deadline = Instant::now().checked_add(duration);
			if deadline.is_none() {
				warn!(
					run_duration_minutes = self.config.bidder.run_duration_minutes,
					"Run duration exceeds the timer range, running without a deadline"
				);
			}
			deadline
		});
		let run_timer = async move {
			match deadline {
				Some(deadline) => tokio::time::sleep_until(deadline).await,
				None => std::future::pending::<()>().await,
			}
		};
		tokio::pin!(shutdown);
		tokio::pin!(run_timer);

		let mut headers_processed = 0u64;
		let mut bids_submitted = 0u64;
		let mut failures = 0u64;
		let mut resubscriptions = 0u64;

		info!(
			endpoint = %mask_endpoint(self.subscriber.endpoint()),
			run_duration_minutes = self.config.bidder.run_duration_minutes,
			"Bidder engine started"
		);

		let stop_reason = loop {
			tokio::select! {
				biased;

				_ = &mut shutdown => {
					info!("Shutdown signal received");
					break StopReason::Shutdown;
				}

				_ = &mut run_timer => {
					info!(
						run_duration_minutes = self.config.bidder.run_duration_minutes,
						"Run duration elapsed"
					);
					break StopReason::DeadlineElapsed;
				}

				next = self.subscription.headers.next() => match next {
					Some(header) => {
						headers_processed += 1;
						match self.handler.handle(self.subscription.chain.as_ref(), &header).await {
							Ok(_) => bids_submitted += 1,
							// the handler has already logged the cause
							Err(_) => failures += 1,
						}
					}
					None => {
						warn!("Header subscription ended, resubscribing");
						match self.subscriber.resubscribe().await {
							Some(subscription) => {
								resubscriptions += 1;
								self.subscription = subscription;
							},
							None => {
								let attempts = self.config.timeouts.resubscribe_attempts;
								error!(attempts, "Giving up on header subscription");
								return Err(EngineError::SubscriptionLost { attempts });
							},
						}
					}
				}
			}
		};

		let summary = RunSummary {
			headers_processed,
			bids_submitted,
			failures,
			resubscriptions,
			stop_reason,
		};
		info!(
			headers_processed,
			bids_submitted,
			failures,
			resubscriptions,
			"Bidder engine stopped"
		);
		Ok(summary)
	}
}
