//! New-header handler.
//!
//! One header in, one bid out: build a transaction for the target block,
//! price a bid, route the transaction (inside the bid or through the relay)
//! and submit. Failures are logged and returned; the engine carries on with
//! the next header either way.

use alloy_primitives::{B256, U256};
use bidder_auction::{
	current_decay_window, sample_bid_amount_wei, BidOutcome, BidTransport, PricingError,
	StreamEnd, TransportError,
};
use bidder_config::Config;
use bidder_delivery::{BundleRelay, ChainReader};
use bidder_transaction::{BuildError, BuiltTransaction, TransactionBuilder};
use bidder_types::{mask_endpoint, Bid, BidError, BidPayload, ChainHeader, GWEI};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Value of the self transfer sent when no blobs are configured.
pub const SELF_TRANSFER_VALUE_WEI: u64 = GWEI;

/// Errors that end processing of a single header.
#[derive(Debug, Error)]
pub enum HandlerError {
	#[error("Failed to build transaction: {0}")]
	Build(#[from] BuildError),
	#[error("Failed to price bid: {0}")]
	Pricing(#[from] PricingError),
	#[error("Invalid bid: {0}")]
	Bid(#[from] BidError),
	#[error("Failed to submit bid: {0}")]
	Transport(#[from] TransportError),
}

/// Result of handling one header.
#[derive(Debug, Clone)]
pub struct HandledHeader {
	pub tx_hash: B256,
	pub target_block: u64,
	pub amount_wei: U256,
	pub outcome: BidOutcome,
}

/// Turns headers into bids.
pub struct HeaderHandler {
	config: Arc<Config>,
	builder: TransactionBuilder,
	transport: BidTransport,
	relay: Option<Arc<dyn BundleRelay>>,
}

impl HeaderHandler {
	/// `relay` is only consulted when bids reference transactions by hash.
	pub fn new(
		config: Arc<Config>,
		builder: TransactionBuilder,
		transport: BidTransport,
		relay: Option<Arc<dyn BundleRelay>>,
	) -> Self {
		Self {
			config,
			builder,
			transport,
			relay,
		}
	}

	#[instrument(skip_all, fields(block_number = header.number))]
	pub async fn handle<C>(&self, chain: &C, header: &ChainHeader) -> Result<HandledHeader, HandlerError>
	where
		C: ChainReader + ?Sized,
	{
		info!(
			block_hash = %header.hash,
			timestamp = header.timestamp,
			"New block received"
		);

		let settings = &self.config.bidder;
		let mut rng = StdRng::from_entropy();

		let built = if settings.num_blobs == 0 {
			self.builder
				.build_self_transfer(
					chain,
					U256::from(SELF_TRANSFER_VALUE_WEI),
					settings.block_offset,
					Some(settings.priority_fee_wei),
				)
				.await
		} else {
			self.builder
				.build_blob_transaction(
					chain,
					settings.num_blobs,
					settings.block_offset,
					Some(settings.priority_fee_wei),
					&mut rng,
				)
				.await
		}
		.inspect_err(|e| error!(error = %e, "Failed to build transaction"))?;

		let window = current_decay_window(settings.decay_duration_ms);
		let amount_wei = sample_bid_amount_wei(
			settings.bid_amount_eth,
			settings.bid_std_dev_percent,
			&mut rng,
		)
		.inspect_err(|e| error!(error = %e, "Failed to price bid"))?;

		let payload = if settings.use_payload {
			BidPayload::from_transaction(built.envelope.clone())
		} else {
			self.forward_to_relay(&built).await;
			BidPayload::from_hash(built.hash())
		};

		let bid = Bid::new(amount_wei, built.target_block, window, payload)
			.inspect_err(|e| error!(error = %e, "Failed to assemble bid"))?;
		let outcome = self
			.transport
			.submit_bid(&bid)
			.await
			.inspect_err(|e| warn!(error = %e, "Failed to submit bid"))?;

		match &outcome.end {
			StreamEnd::Completed => info!(
				tx_hash = %built.hash(),
				target_block = built.target_block,
				commitments = outcome.commitments.len(),
				"Bid round complete"
			),
			StreamEnd::Failed(reason) => warn!(
				tx_hash = %built.hash(),
				target_block = built.target_block,
				commitments = outcome.commitments.len(),
				reason = %reason,
				"Bid round ended early"
			),
		}

		Ok(HandledHeader {
			tx_hash: built.hash(),
			target_block: built.target_block,
			amount_wei,
			outcome,
		})
	}

	/// Sends the transaction to the relay. Relay problems are logged only;
	/// the hash bid goes out regardless.
	async fn forward_to_relay(&self, built: &BuiltTransaction) {
		let Some(relay) = &self.relay else {
			error!(
				endpoint = %mask_endpoint(&self.config.endpoints.rpc),
				"No relay available, bid will reference an unsent transaction"
			);
			return;
		};

		match relay
			.send_bundle(vec![built.encoded()], built.target_block)
			.await
		{
			Ok(result) => info!(
				tx_hash = %built.hash(),
				target_block = built.target_block,
				result = %result,
				"Bundle sent to relay"
			),
			Err(e) => error!(
				tx_hash = %built.hash(),
				target_block = built.target_block,
				error = %e,
				"Failed to send bundle to relay"
			),
		}
	}
}
