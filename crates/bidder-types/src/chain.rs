//! Header snapshot read from the execution layer.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Fields of a block header the bidder prices and targets against.
///
/// Pre-London headers have no base fee and pre-Cancun headers carry no blob
/// gas accounting, so those fields are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainHeader {
	pub number: u64,
	pub hash: B256,
	/// Seconds since the unix epoch.
	pub timestamp: u64,
	pub base_fee_per_gas: Option<u64>,
	pub excess_blob_gas: Option<u64>,
	pub blob_gas_used: Option<u64>,
}

impl ChainHeader {
	/// Block number a transaction built on top of this header should land in.
	pub fn target_block(&self, offset: u64) -> u64 {
		self.number.saturating_add(offset)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_target_block_adds_offset() {
		let header = ChainHeader {
			number: 100,
			..Default::default()
		};
		assert_eq!(header.target_block(1), 101);
		assert_eq!(header.target_block(0), 100);
		assert_eq!(
			ChainHeader {
				number: u64::MAX,
				..Default::default()
			}
			.target_block(3),
			u64::MAX
		);
	}
}
