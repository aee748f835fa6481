//! Bid submission over the bidder node's gRPC API.
//!
//! A submitted bid opens a server stream; the node pushes one commitment
//! per provider that accepts the bid and closes the stream when the
//! auction for that bid is over.

use crate::proto::bidderapi::v1::{self as proto, bidder_client::BidderClient};
use alloy_eips::eip2718::Encodable2718;
use async_trait::async_trait;
use bidder_types::{truncate_id, without_0x_prefix, Bid, BidPayload};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};
use tracing::{info, warn};

pub use proto::Commitment;

/// Commitments as they arrive from the node.
pub type CommitmentStream = Pin<Box<dyn Stream<Item = Result<Commitment, tonic::Status>> + Send>>;

/// Errors that can occur while submitting a bid.
#[derive(Debug, Error)]
pub enum TransportError {
	/// Rejected before anything was sent.
	#[error("Unsupported bid input: {0}")]
	UnsupportedInput(String),
	#[error("Invalid server address: {0}")]
	InvalidAddress(String),
	#[error("Bid submission failed: {0}")]
	Rpc(String),
}

/// The bidder node's bid endpoint.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BidderApi: Send + Sync {
	async fn send_bid(&self, request: proto::Bid) -> Result<CommitmentStream, tonic::Status>;
}

/// gRPC client for the bidder node.
#[derive(Debug, Clone)]
pub struct GrpcBidderApi {
	client: BidderClient<Channel>,
}

impl GrpcBidderApi {
	/// Creates a client without dialing; the connection is made on first
	/// use. Addresses without a scheme are taken as plaintext `host:port`.
	pub fn connect_lazy(server_address: &str) -> Result<Self, TransportError> {
		let uri = if server_address.contains("://") {
			server_address.to_string()
		} else {
			format!("http://{server_address}")
		};
		let channel = Endpoint::from_shared(uri)
			.map_err(|e| TransportError::InvalidAddress(format!("{server_address}: {e}")))?
			.connect_lazy();
		Ok(Self {
			client: BidderClient::new(channel),
		})
	}
}

#[async_trait]
impl BidderApi for GrpcBidderApi {
	async fn send_bid(&self, request: proto::Bid) -> Result<CommitmentStream, tonic::Status> {
		let mut client = self.client.clone();
		let response = client.send_bid(request).await?;
		Ok(response.into_inner().boxed())
	}
}

/// How the commitment stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
	Completed,
	Failed(String),
}

/// Everything the node sent back for one bid.
#[derive(Debug, Clone)]
pub struct BidOutcome {
	pub commitments: Vec<Commitment>,
	pub end: StreamEnd,
}

/// Builds the wire request for `bid`.
///
/// Hashes are sent without "0x"; raw transactions are hex EIP-2718
/// encodings, also without "0x".
pub fn bid_request(bid: &Bid) -> Result<proto::Bid, TransportError> {
	if bid.payload.is_empty() {
		return Err(TransportError::UnsupportedInput(
			"bid carries no transactions".into(),
		));
	}
	let block_number = i64::try_from(bid.block_number).map_err(|_| {
		TransportError::UnsupportedInput(format!("block number {} out of range", bid.block_number))
	})?;

	let mut request = proto::Bid {
		amount: bid.amount_wei.to_string(),
		block_number,
		decay_start_timestamp: bid.window.start_ms,
		decay_end_timestamp: bid.window.end_ms,
		..Default::default()
	};

	match &bid.payload {
		BidPayload::ByHash(hashes) => {
			request.tx_hashes = hashes
				.iter()
				.map(|hash| {
					let hex = without_0x_prefix(hash.trim());
					if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
						return Err(TransportError::UnsupportedInput(format!(
							"{hash:?} is not a hex transaction hash"
						)));
					}
					Ok(hex.to_string())
				})
				.collect::<Result<_, _>>()?;
		},
		BidPayload::ByRawTransaction(transactions) => {
			request.raw_transactions = transactions
				.iter()
				.map(|tx| hex::encode(tx.encoded_2718()))
				.collect();
		},
	}

	Ok(request)
}

/// Sends bids and drains their commitment streams.
#[derive(Clone)]
pub struct BidTransport {
	api: Arc<dyn BidderApi>,
}

impl BidTransport {
	pub fn new(api: Arc<dyn BidderApi>) -> Self {
		Self { api }
	}

	/// Submits `bid` and collects commitments until the stream ends.
	///
	/// Malformed payloads fail before the node is contacted. A stream that
	/// breaks after opening is not an error: the commitments received so
	/// far are returned with [`StreamEnd::Failed`].
	pub async fn submit_bid(&self, bid: &Bid) -> Result<BidOutcome, TransportError> {
		let request = bid_request(bid)?;
		info!(
			block_number = bid.block_number,
			amount_wei = %bid.amount_wei,
			payload = bid.payload.kind(),
			transactions = bid.payload.len(),
			decay_start_ms = bid.window.start_ms,
			decay_end_ms = bid.window.end_ms,
			"Sending bid"
		);

		let mut stream = self
			.api
			.send_bid(request)
			.await
			.map_err(|status| TransportError::Rpc(status.to_string()))?;

		let mut commitments = Vec::new();
		while let Some(item) = stream.next().await {
			match item {
				Ok(commitment) => {
					info!(
						block_number = commitment.block_number,
						bid_amount = %commitment.bid_amount,
						provider = %commitment.provider_address,
						commitment_digest = %truncate_id(&commitment.commitment_digest),
						"Bid accepted"
					);
					commitments.push(commitment);
				},
				Err(status) => {
					warn!(
						code = ?status.code(),
						message = status.message(),
						received = commitments.len(),
						"Commitment stream failed"
					);
					return Ok(BidOutcome {
						commitments,
						end: StreamEnd::Failed(status.to_string()),
					});
				},
			}
		}

		Ok(BidOutcome {
			commitments,
			end: StreamEnd::Completed,
		})
	}
}
