//! Alloy-backed chain handle.
//!
//! One `RootProvider` serves both HTTP and websocket endpoints; the
//! connection string picks the transport.

use crate::{ChainError, ChainReader};
use alloy_network::Ethereum;
use alloy_primitives::Address;
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::{BlockNumberOrTag, Header};
use async_trait::async_trait;
use bidder_types::{mask_endpoint, ChainHeader};

/// Connected execution-layer client.
#[derive(Clone, Debug)]
pub struct AlloyChain {
	provider: RootProvider<Ethereum>,
	endpoint: String,
}

impl AlloyChain {
	/// Dials `endpoint` (http, https, ws or wss).
	pub async fn connect(endpoint: &str) -> Result<Self, ChainError> {
		let provider = RootProvider::connect(endpoint).await.map_err(|e| {
			ChainError::Connection(format!("{}: {}", mask_endpoint(endpoint), e))
		})?;
		Ok(Self {
			provider,
			endpoint: endpoint.to_string(),
		})
	}

	pub fn provider(&self) -> &RootProvider<Ethereum> {
		&self.provider
	}

	/// Endpoint with everything after the first ten characters hidden.
	pub fn masked_endpoint(&self) -> String {
		mask_endpoint(&self.endpoint)
	}
}

/// Copies the fields the bidder uses out of an RPC header.
pub fn header_snapshot(header: &Header) -> ChainHeader {
	ChainHeader {
		number: header.inner.number,
		hash: header.hash,
		timestamp: header.inner.timestamp,
		base_fee_per_gas: header.inner.base_fee_per_gas,
		excess_blob_gas: header.inner.excess_blob_gas,
		blob_gas_used: header.inner.blob_gas_used,
	}
}

#[async_trait]
impl ChainReader for AlloyChain {
	async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
		self.provider
			.get_transaction_count(address)
			.pending()
			.await
			.map_err(|e| ChainError::Rpc(format!("failed to get pending nonce: {e}")))
	}

	async fn latest_header(&self) -> Result<ChainHeader, ChainError> {
		let block = self
			.provider
			.get_block_by_number(BlockNumberOrTag::Latest)
			.await
			.map_err(|e| ChainError::Rpc(format!("failed to get latest block: {e}")))?
			.ok_or_else(|| ChainError::BlockNotFound("latest".to_string()))?;
		Ok(header_snapshot(&block.header))
	}

	async fn chain_id(&self) -> Result<u64, ChainError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| ChainError::Rpc(format!("failed to get chain id: {e}")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::B256;

	#[test]
	fn test_header_snapshot_copies_fee_fields() {
		let header = Header {
			hash: B256::repeat_byte(0x11),
			inner: alloy_consensus::Header {
				number: 100,
				timestamp: 1_700_000_000,
				base_fee_per_gas: Some(7),
				excess_blob_gas: Some(393_216),
				blob_gas_used: Some(131_072),
				..Default::default()
			},
			total_difficulty: None,
			size: None,
		};

		let snapshot = header_snapshot(&header);
		assert_eq!(snapshot.number, 100);
		assert_eq!(snapshot.hash, B256::repeat_byte(0x11));
		assert_eq!(snapshot.timestamp, 1_700_000_000);
		assert_eq!(snapshot.base_fee_per_gas, Some(7));
		assert_eq!(snapshot.excess_blob_gas, Some(393_216));
		assert_eq!(snapshot.blob_gas_used, Some(131_072));
	}

	#[tokio::test]
	async fn test_connect_rejects_unknown_scheme() {
		let err = AlloyChain::connect("ftp://example.org").await.unwrap_err();
		assert!(matches!(err, ChainError::Connection(_)));
	}
}
