//! Signing identity for the bidder.
//!
//! The identity pairs a secp256k1 key with the chain ID read from the
//! execution layer at startup. Every transaction it signs must carry that
//! chain ID, so a transaction built for one network can never be signed for
//! another by mistake.

use alloy_consensus::{SignableTransaction, Signed, Transaction};
use alloy_primitives::{Address, Signature};
use alloy_signer::{Signer, SignerSync};
use alloy_signer_local::PrivateKeySigner;
use bidder_types::{without_0x_prefix, SecretString};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Transaction chain id {actual:?} does not match signer chain id {expected}")]
	ChainMismatch { expected: u64, actual: Option<u64> },
}

/// Key pair bound to a chain.
#[derive(Clone)]
pub struct SigningIdentity {
	signer: PrivateKeySigner,
	chain_id: u64,
}

impl SigningIdentity {
	/// Parses a hex private key, with or without "0x", and binds it to
	/// `chain_id`.
	pub fn from_private_key(key: &SecretString, chain_id: u64) -> Result<Self, AccountError> {
		let signer = key
			.with_exposed(|raw| PrivateKeySigner::from_str(without_0x_prefix(raw.trim())))
			.map_err(|e| AccountError::InvalidKey(e.to_string()))?
			.with_chain_id(Some(chain_id));
		Ok(Self { signer, chain_id })
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Signs `tx`, refusing transactions that target another chain.
	pub fn sign_transaction<T>(&self, tx: T) -> Result<Signed<T>, AccountError>
	where
		T: SignableTransaction<Signature>,
	{
		if tx.chain_id() != Some(self.chain_id) {
			return Err(AccountError::ChainMismatch {
				expected: self.chain_id,
				actual: tx.chain_id(),
			});
		}
		let signature = self
			.signer
			.sign_hash_sync(&tx.signature_hash())
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		Ok(tx.into_signed(signature))
	}
}

impl fmt::Debug for SigningIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SigningIdentity")
			.field("address", &self.address())
			.field("chain_id", &self.chain_id)
			.finish()
	}
}
