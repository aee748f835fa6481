//! Execution-layer access for the bidder.
//!
//! Three concerns live here: reading chain state (nonce, latest header,
//! chain ID) behind the [`ChainReader`] seam, dialing an RPC endpoint with
//! bounded exponential backoff, and forwarding signed transactions to a
//! relay with `eth_sendBundle`.

use async_trait::async_trait;
use alloy_primitives::Address;
use bidder_types::ChainHeader;
use std::time::Duration;
use thiserror::Error;

pub mod connection;
pub mod relay;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use connection::{connect_with_retries, dial_with_retries};
pub use implementations::evm::alloy::AlloyChain;
pub use relay::{BundleRelay, RelayClient, RelayError};

#[cfg(any(test, feature = "testing"))]
pub use relay::MockBundleRelay;

/// Errors raised while talking to the execution layer.
#[derive(Debug, Error)]
pub enum ChainError {
	#[error("Connection error: {0}")]
	Connection(String),
	#[error("RPC error: {0}")]
	Rpc(String),
	#[error("Chain read timed out after {0:?}")]
	Timeout(Duration),
	#[error("Block not found: {0}")]
	BlockNotFound(String),
}

/// Read access to chain state needed to build transactions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Next nonce for `address`, counting pending transactions.
	async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError>;

	/// Header of the latest block.
	async fn latest_header(&self) -> Result<ChainHeader, ChainError>;

	async fn chain_id(&self) -> Result<u64, ChainError>;
}
