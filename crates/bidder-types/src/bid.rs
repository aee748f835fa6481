//! Bid model.
//!
//! A bid offers an amount of wei to have a payload included in a specific
//! block, with the offer decaying linearly across a millisecond window. The
//! payload either references transactions already known to the network by
//! hash, or carries the signed transactions themselves.

use alloy_consensus::TxEnvelope;
use alloy_primitives::{B256, U256};
use thiserror::Error;

/// Errors raised when assembling a bid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BidError {
	#[error("Bid amount must be greater than zero")]
	ZeroAmount,
	#[error("Decay window end {end_ms} is not after start {start_ms}")]
	InvalidWindow { start_ms: i64, end_ms: i64 },
	#[error("Bid payload contains no transactions")]
	EmptyPayload,
}

/// Interval over which the bid value decays, in unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayWindow {
	pub start_ms: i64,
	pub end_ms: i64,
}

impl DecayWindow {
	/// Window opening at `start_ms` and lasting `duration_ms`.
	pub fn starting_at(start_ms: i64, duration_ms: u64) -> Self {
		let duration = i64::try_from(duration_ms).unwrap_or(i64::MAX);
		Self {
			start_ms,
			end_ms: start_ms.saturating_add(duration),
		}
	}

	pub fn duration_ms(&self) -> i64 {
		self.end_ms - self.start_ms
	}
}

/// What a bid asks the provider to include.
#[derive(Debug, Clone, PartialEq)]
pub enum BidPayload {
	/// Hex transaction hashes, optionally "0x"-prefixed.
	ByHash(Vec<String>),
	/// Signed transactions sent in full.
	ByRawTransaction(Vec<TxEnvelope>),
}

impl BidPayload {
	/// Payload referencing a single transaction hash.
	pub fn from_hash(hash: B256) -> Self {
		Self::ByHash(vec![hash.to_string()])
	}

	/// Payload carrying a single signed transaction.
	pub fn from_transaction(tx: TxEnvelope) -> Self {
		Self::ByRawTransaction(vec![tx])
	}

	pub fn len(&self) -> usize {
		match self {
			Self::ByHash(hashes) => hashes.len(),
			Self::ByRawTransaction(txs) => txs.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Short label for logs.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::ByHash(_) => "tx_hashes",
			Self::ByRawTransaction(_) => "raw_transactions",
		}
	}
}

/// A validated bid ready for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Bid {
	pub amount_wei: U256,
	pub block_number: u64,
	pub window: DecayWindow,
	pub payload: BidPayload,
}

impl Bid {
	pub fn new(
		amount_wei: U256,
		block_number: u64,
		window: DecayWindow,
		payload: BidPayload,
	) -> Result<Self, BidError> {
		if amount_wei.is_zero() {
			return Err(BidError::ZeroAmount);
		}
		if window.end_ms <= window.start_ms {
			return Err(BidError::InvalidWindow {
				start_ms: window.start_ms,
				end_ms: window.end_ms,
			});
		}
		if payload.is_empty() {
			return Err(BidError::EmptyPayload);
		}
		Ok(Self {
			amount_wei,
			block_number,
			window,
			payload,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn window() -> DecayWindow {
		DecayWindow::starting_at(1_700_000_000_000, 36_000)
	}

	#[test]
	fn test_decay_window_width() {
		let window = window();
		assert_eq!(window.end_ms - window.start_ms, 36_000);
		assert_eq!(window.duration_ms(), 36_000);
	}

	#[test]
	fn test_bid_rejects_zero_amount() {
		let err = Bid::new(
			U256::ZERO,
			101,
			window(),
			BidPayload::ByHash(vec!["abc".into()]),
		)
		.unwrap_err();
		assert_eq!(err, BidError::ZeroAmount);
	}

	#[test]
	fn test_bid_rejects_inverted_window() {
		let window = DecayWindow {
			start_ms: 10,
			end_ms: 10,
		};
		let err = Bid::new(
			U256::from(1u64),
			101,
			window,
			BidPayload::ByHash(vec!["abc".into()]),
		)
		.unwrap_err();
		assert!(matches!(err, BidError::InvalidWindow { .. }));
	}

	#[test]
	fn test_bid_rejects_empty_payload() {
		let err = Bid::new(
			U256::from(1u64),
			101,
			window(),
			BidPayload::ByRawTransaction(Vec::new()),
		)
		.unwrap_err();
		assert_eq!(err, BidError::EmptyPayload);
	}

	#[test]
	fn test_payload_from_hash_is_prefixed() {
		let payload = BidPayload::from_hash(B256::repeat_byte(0xab));
		match payload {
			BidPayload::ByHash(hashes) => {
				assert_eq!(hashes.len(), 1);
				assert!(hashes[0].starts_with("0xabab"));
			},
			other => panic!("unexpected payload {other:?}"),
		}
	}
}
