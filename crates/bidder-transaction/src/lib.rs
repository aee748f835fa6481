//! Transaction construction for the bidder.
//!
//! Each new header produces one signed transaction from the bidder's own
//! account back to itself: either a plain EIP-1559 value transfer or an
//! EIP-4844 transaction carrying freshly generated random blobs. Fees are
//! derived from the latest header; the target block is that header's
//! number plus the configured offset.

pub mod blob;

use alloy_consensus::{
	TxEip1559, TxEip4844, TxEip4844Variant, TxEip4844WithSidecar, TxEnvelope,
};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Bytes, TxKind, B256, U256};
use bidder_account::{AccountError, SigningIdentity};
use bidder_delivery::{ChainError, ChainReader};
use bidder_types::ChainHeader;
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use blob::{blob_fee_cap, random_blob_bundle, BlobBundle};

/// Gas limit for every transaction the bidder builds; five times the
/// intrinsic cost of a plain transfer.
pub const GAS_LIMIT: u64 = 105_000;

/// Tip used when none is configured.
pub const DEFAULT_PRIORITY_FEE_WEI: u128 = 1;

/// Errors that can occur while building a transaction.
#[derive(Debug, Error)]
pub enum BuildError {
	#[error("Chain read failed: {0}")]
	Chain(#[from] ChainError),
	#[error("Latest header has no {0}")]
	MissingHeaderField(&'static str),
	#[error("Blob transaction needs at least one blob")]
	NoBlobs,
	#[error("KZG error: {0}")]
	Kzg(String),
	#[error("Signing failed: {0}")]
	Signing(#[from] AccountError),
}

/// A signed transaction and the block it is meant for.
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
	pub envelope: TxEnvelope,
	pub target_block: u64,
	/// Header the fees were derived from.
	pub header: ChainHeader,
}

impl BuiltTransaction {
	pub fn hash(&self) -> B256 {
		*self.envelope.tx_hash()
	}

	/// EIP-2718 encoding; blob transactions include their sidecar.
	pub fn encoded(&self) -> Bytes {
		self.envelope.encoded_2718().into()
	}
}

struct ChainState {
	chain_id: u64,
	nonce: u64,
	header: ChainHeader,
	base_fee: u128,
}

/// Builds and signs self-addressed transactions for one identity.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
	identity: Arc<SigningIdentity>,
	read_timeout: Duration,
}

impl TransactionBuilder {
	/// `read_timeout` bounds the chain reads of each build as a whole.
	pub fn new(identity: Arc<SigningIdentity>, read_timeout: Duration) -> Self {
		Self {
			identity,
			read_timeout,
		}
	}

	pub fn identity(&self) -> &SigningIdentity {
		&self.identity
	}

	async fn read_chain_state<C>(&self, chain: &C) -> Result<ChainState, BuildError>
	where
		C: ChainReader + ?Sized,
	{
		let reads = async {
			tokio::try_join!(
				chain.chain_id(),
				chain.pending_nonce(self.identity.address()),
				chain.latest_header(),
			)
		};
		let (chain_id, nonce, header) = tokio::time::timeout(self.read_timeout, reads)
			.await
			.map_err(|_| ChainError::Timeout(self.read_timeout))??;
		let base_fee = header
			.base_fee_per_gas
			.ok_or(BuildError::MissingHeaderField("base_fee_per_gas"))?;

		Ok(ChainState {
			chain_id,
			nonce,
			header,
			base_fee: u128::from(base_fee),
		})
	}

	/// Signed EIP-1559 transfer of `value` wei from the identity to itself.
	///
	/// The fee cap is the latest base fee plus the tip.
	pub async fn build_self_transfer<C>(
		&self,
		chain: &C,
		value: U256,
		block_offset: u64,
		priority_fee_wei: Option<u128>,
	) -> Result<BuiltTransaction, BuildError>
	where
		C: ChainReader + ?Sized,
	{
		let state = self.read_chain_state(chain).await?;
		let tip = priority_fee_wei.unwrap_or(DEFAULT_PRIORITY_FEE_WEI);

		let tx = TxEip1559 {
			chain_id: state.chain_id,
			nonce: state.nonce,
			gas_limit: GAS_LIMIT,
			max_fee_per_gas: state.base_fee.saturating_add(tip),
			max_priority_fee_per_gas: tip,
			to: TxKind::Call(self.identity.address()),
			value,
			access_list: Default::default(),
			input: Bytes::new(),
		};
		let signed = self.identity.sign_transaction(tx)?;
		debug!(
			tx_hash = %signed.hash(),
			nonce = state.nonce,
			base_fee = state.base_fee,
			"Built self transfer"
		);

		Ok(BuiltTransaction {
			envelope: TxEnvelope::from(signed),
			target_block: state.header.target_block(block_offset),
			header: state.header,
		})
	}

	/// Signed EIP-4844 transaction to self carrying `blob_count` random
	/// blobs.
	pub async fn build_blob_transaction<C, R>(
		&self,
		chain: &C,
		blob_count: usize,
		block_offset: u64,
		priority_fee_wei: Option<u128>,
		rng: &mut R,
	) -> Result<BuiltTransaction, BuildError>
	where
		C: ChainReader + ?Sized,
		R: RngCore + Send + ?Sized,
	{
		if blob_count == 0 {
			return Err(BuildError::NoBlobs);
		}

		let state = self.read_chain_state(chain).await?;
		let max_fee_per_blob_gas = blob_fee_cap(&state.header)?;
		let BlobBundle {
			sidecar,
			versioned_hashes,
		} = random_blob_bundle(blob_count, rng)?;
		let tip = priority_fee_wei.unwrap_or(DEFAULT_PRIORITY_FEE_WEI);

		let tx = TxEip4844 {
			chain_id: state.chain_id,
			nonce: state.nonce,
			gas_limit: GAS_LIMIT,
			max_fee_per_gas: state.base_fee.saturating_add(tip),
			max_priority_fee_per_gas: tip,
			to: self.identity.address(),
			value: U256::ZERO,
			access_list: Default::default(),
			blob_versioned_hashes: versioned_hashes,
			max_fee_per_blob_gas,
			input: Bytes::new(),
		};
		let tx: TxEip4844Variant = TxEip4844Variant::from(TxEip4844WithSidecar::from_tx_and_sidecar(tx, sidecar));
		let signed = self.identity.sign_transaction(tx)?;
		debug!(
			tx_hash = %signed.hash(),
			nonce = state.nonce,
			blobs = blob_count,
			max_fee_per_blob_gas,
			"Built blob transaction"
		);

		Ok(BuiltTransaction {
			envelope: TxEnvelope::from(signed),
			target_block: state.header.target_block(block_offset),
			header: state.header,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_consensus::Transaction;
	use alloy_eips::eip4844::kzg_to_versioned_hash;
	use bidder_delivery::MockChainReader;
	use bidder_types::{SecretString, GWEI};
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const CHAIN_ID: u64 = 17000;

	fn builder() -> TransactionBuilder {
		let identity =
			SigningIdentity::from_private_key(&SecretString::from(KEY), CHAIN_ID).unwrap();
		TransactionBuilder::new(Arc::new(identity), Duration::from_secs(15))
	}

	fn chain_at(header: ChainHeader) -> MockChainReader {
		let mut chain = MockChainReader::new();
		chain.expect_chain_id().returning(|| Ok(CHAIN_ID));
		chain.expect_pending_nonce().returning(|_| Ok(42));
		chain
			.expect_latest_header()
			.returning(move || Ok(header));
		chain
	}

	fn cancun_header(number: u64, base_fee: u64) -> ChainHeader {
		ChainHeader {
			number,
			base_fee_per_gas: Some(base_fee),
			excess_blob_gas: Some(0),
			blob_gas_used: Some(0),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn test_self_transfer_targets_next_block() {
		let builder = builder();
		let chain = chain_at(cancun_header(100, 7 * GWEI));

		let built = builder
			.build_self_transfer(&chain, U256::from(GWEI), 1, Some(3))
			.await
			.unwrap();

		assert_eq!(built.target_block, 101);
		let TxEnvelope::Eip1559(signed) = &built.envelope else {
			panic!("expected an EIP-1559 transaction");
		};
		let tx = signed.tx();
		assert_eq!(tx.chain_id, CHAIN_ID);
		assert_eq!(tx.nonce, 42);
		assert_eq!(tx.gas_limit, GAS_LIMIT);
		assert_eq!(tx.max_fee_per_gas, u128::from(7 * GWEI) + 3);
		assert_eq!(tx.max_priority_fee_per_gas, 3);
		assert_eq!(tx.to, TxKind::Call(builder.identity().address()));
		assert_eq!(tx.value, U256::from(GWEI));
	}

	#[tokio::test]
	async fn test_default_priority_fee() {
		let chain = chain_at(cancun_header(5, 100));
		let built = builder()
			.build_self_transfer(&chain, U256::from(1u64), 2, None)
			.await
			.unwrap();

		assert_eq!(built.target_block, 7);
		assert_eq!(built.envelope.max_priority_fee_per_gas(), Some(DEFAULT_PRIORITY_FEE_WEI));
		assert_eq!(built.envelope.max_fee_per_gas(), 100 + DEFAULT_PRIORITY_FEE_WEI);
	}

	#[tokio::test]
	async fn test_missing_base_fee_is_an_error() {
		let chain = chain_at(ChainHeader {
			number: 1,
			..Default::default()
		});
		let err = builder()
			.build_self_transfer(&chain, U256::from(1u64), 1, None)
			.await
			.unwrap_err();
		assert!(matches!(err, BuildError::MissingHeaderField("base_fee_per_gas")));
	}

	#[tokio::test]
	async fn test_chain_read_failure_aborts_build() {
		let mut chain = MockChainReader::new();
		chain.expect_chain_id().returning(|| Ok(CHAIN_ID));
		chain
			.expect_pending_nonce()
			.returning(|_| Err(ChainError::Rpc("nonce unavailable".into())));
		chain
			.expect_latest_header()
			.returning(|| Ok(cancun_header(1, 1)));

		let err = builder()
			.build_self_transfer(&chain, U256::from(1u64), 1, None)
			.await
			.unwrap_err();
		assert!(matches!(err, BuildError::Chain(ChainError::Rpc(_))));
	}

	#[tokio::test]
	async fn test_foreign_chain_id_is_refused() {
		let mut chain = MockChainReader::new();
		chain.expect_chain_id().returning(|| Ok(1));
		chain.expect_pending_nonce().returning(|_| Ok(0));
		chain
			.expect_latest_header()
			.returning(|| Ok(cancun_header(1, 1)));

		let err = builder()
			.build_self_transfer(&chain, U256::from(1u64), 1, None)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			BuildError::Signing(AccountError::ChainMismatch { .. })
		));
	}

	#[tokio::test]
	async fn test_blob_transaction_commits_to_sidecar() {
		let builder = builder();
		let chain = chain_at(cancun_header(100, 7));
		let mut rng = StdRng::seed_from_u64(99);

		let built = builder
			.build_blob_transaction(&chain, 2, 1, Some(5), &mut rng)
			.await
			.unwrap();

		assert_eq!(built.target_block, 101);
		let TxEnvelope::Eip4844(signed) = &built.envelope else {
			panic!("expected a blob transaction");
		};
		let TxEip4844Variant::TxEip4844WithSidecar(with_sidecar) = signed.tx() else {
			panic!("expected the sidecar to be attached");
		};
		let tx = &with_sidecar.tx;
		assert_eq!(tx.blob_versioned_hashes.len(), 2);
		for (hash, commitment) in tx
			.blob_versioned_hashes
			.iter()
			.zip(with_sidecar.sidecar.commitments())
		{
			assert_eq!(*hash, kzg_to_versioned_hash(commitment.as_slice()));
		}
		assert_eq!(tx.to, builder.identity().address());
		assert_eq!(tx.value, U256::ZERO);
		assert_eq!(tx.max_fee_per_gas, 12);
		assert_eq!(tx.max_priority_fee_per_gas, 5);
		assert_eq!(tx.max_fee_per_blob_gas, 2);
		assert_eq!(tx.gas_limit, GAS_LIMIT);
	}

	#[tokio::test]
	async fn test_zero_blobs_is_rejected_before_reading_chain() {
		let chain = MockChainReader::new();
		let err = builder()
			.build_blob_transaction(&chain, 0, 1, None, &mut StdRng::seed_from_u64(0))
			.await
			.unwrap_err();
		assert!(matches!(err, BuildError::NoBlobs));
	}

	#[tokio::test(start_paused = true)]
	async fn test_hung_chain_read_times_out() {
		let mut chain = MockChainReader::new();
		chain.expect_chain_id().returning(|| Ok(CHAIN_ID));
		chain.expect_pending_nonce().returning(|_| Ok(0));
		chain.expect_latest_header().returning(|| Ok(cancun_header(1, 1)));

		struct Hung(MockChainReader);

		#[async_trait::async_trait]
		impl ChainReader for Hung {
			async fn pending_nonce(&self, address: alloy_primitives::Address) -> Result<u64, ChainError> {
				self.0.pending_nonce(address).await
			}

			async fn latest_header(&self) -> Result<ChainHeader, ChainError> {
				std::future::pending().await
			}

			async fn chain_id(&self) -> Result<u64, ChainError> {
				self.0.chain_id().await
			}
		}

		let err = builder()
			.build_self_transfer(&Hung(chain), U256::from(1u64), 1, None)
			.await
			.unwrap_err();
		assert!(matches!(err, BuildError::Chain(ChainError::Timeout(_))));
	}
}
