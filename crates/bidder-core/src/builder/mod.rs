//! Wiring for a ready-to-run [`BidderEngine`].
//!
//! Order matters: the header subscription comes first because the chain ID
//! used to bind the signing identity is read from the subscribed handle.

use crate::engine::BidderEngine;
use crate::handlers::HeaderHandler;
use bidder_account::{AccountError, SigningIdentity};
use bidder_auction::{BidTransport, BidderApi, GrpcBidderApi, TransportError};
use bidder_config::{Config, ConfigError};
use bidder_delivery::{
	connect_with_retries, BundleRelay, ChainError, ChainReader, RelayClient, RelayError,
};
use bidder_discovery::{ChainConnector, HeaderSubscriber, SubscriptionError, WsConnector};
use bidder_transaction::TransactionBuilder;
use bidder_types::mask_endpoint;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),
	#[error("Subscription error: {0}")]
	Subscription(#[from] SubscriptionError),
	#[error("Authentication failed: {0}")]
	Authentication(#[from] ChainError),
	#[error("Account error: {0}")]
	Account(#[from] AccountError),
	#[error("Transport error: {0}")]
	Transport(#[from] TransportError),
	#[error("Relay error: {0}")]
	Relay(#[from] RelayError),
}

/// Builds a [`BidderEngine`] from a validated [`Config`].
pub struct BidderBuilder {
	config: Config,
}

impl BidderBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds against the real network: websocket headers, the bidder node
	/// over gRPC and, in bundle mode, the relay behind the RPC endpoint.
	pub async fn build(self) -> Result<BidderEngine<WsConnector>, BuilderError> {
		let api = GrpcBidderApi::connect_lazy(&self.config.bidder.server_address)?;
		info!(
			server_address = %self.config.bidder.server_address,
			"Bidder node client ready"
		);

		let relay = if self.config.bidder.use_payload {
			None
		} else {
			self.connect_relay().await?
		};

		self.build_with(WsConnector, Arc::new(api), relay).await
	}

	/// Bundle mode only. An unreachable RPC endpoint is not fatal: bids still
	/// go out by hash, the relay step is skipped.
	async fn connect_relay(&self) -> Result<Option<Arc<dyn BundleRelay>>, BuilderError> {
		let endpoints = &self.config.endpoints;
		let timeouts = &self.config.timeouts;
		let reachable = connect_with_retries(
			&endpoints.rpc,
			timeouts.rpc_connect_attempts,
			timeouts.default_timeout(),
		)
		.await
		.is_some();

		if !reachable {
			error!(
				endpoint = %mask_endpoint(&endpoints.rpc),
				"RPC endpoint unreachable, bundles will not be relayed"
			);
			return Ok(None);
		}

		let relay = RelayClient::new(endpoints.rpc.clone(), timeouts.default_timeout())?;
		Ok(Some(Arc::new(relay)))
	}

	/// Builds with caller-supplied network seams.
	pub async fn build_with<C: ChainConnector>(
		self,
		connector: C,
		api: Arc<dyn BidderApi>,
		relay: Option<Arc<dyn BundleRelay>>,
	) -> Result<BidderEngine<C>, BuilderError> {
		let config = Arc::new(self.config);
		let timeouts = &config.timeouts;

		let subscriber = HeaderSubscriber::new(
			connector,
			config.endpoints.ws.clone(),
			timeouts.reconnect_delay(),
			timeouts.resubscribe_attempts,
			timeouts.resubscribe_delay(),
		);
		let subscription = subscriber.subscribe().await.inspect_err(|e| {
			error!(
				endpoint = %mask_endpoint(subscriber.endpoint()),
				error = %e,
				"Failed to subscribe to new headers"
			)
		})?;

		let chain_id = tokio::time::timeout(timeouts.default_timeout(), subscription.chain.chain_id())
			.await
			.map_err(|_| ChainError::Timeout(timeouts.default_timeout()))??;
		let identity = SigningIdentity::from_private_key(config.private_key()?, chain_id)?;
		info!(address = %identity.address(), chain_id, "Authenticated");

		let builder = TransactionBuilder::new(Arc::new(identity), timeouts.default_timeout());
		let handler = HeaderHandler::new(config.clone(), builder, BidTransport::new(api), relay);

		Ok(BidderEngine::new(config, handler, subscriber, subscription))
	}
}
