//! Bidding against the preconfirmation auction.
//!
//! Prices bids, frames their decay windows and submits them to the bidder
//! node, draining the commitment stream each submission opens.

pub mod pricing;
pub mod transport;

/// Protobuf messages and client for the bidder node API.
pub mod proto {
	pub mod bidderapi {
		pub mod v1 {
			include!("generated/bidderapi.v1.rs");
		}
	}
}

pub use pricing::{
	current_decay_window, decay_window, eth_to_wei, sample_bid_amount_eth, sample_bid_amount_wei,
	PricingError,
};
pub use transport::{
	bid_request, BidOutcome, BidTransport, BidderApi, Commitment, CommitmentStream,
	GrpcBidderApi, StreamEnd, TransportError,
};

#[cfg(any(test, feature = "testing"))]
pub use transport::MockBidderApi;
