//! Blob sidecar generation and blob gas pricing.

use crate::BuildError;
use alloy_eips::eip4844::env_settings::EnvKzgSettings;
use alloy_eips::eip4844::{
	calc_blob_gasprice, calc_excess_blob_gas, kzg_to_versioned_hash, Blob, Bytes48,
	BYTES_PER_BLOB,
};
use alloy_eips::eip4844::BlobTransactionSidecar;
use alloy_primitives::{uint, B256, U256};
use bidder_types::ChainHeader;
use rand::RngCore;

/// Order of the BLS12-381 scalar field. Every 32-byte chunk of a blob must
/// encode a value below it.
const BLS_MODULUS: U256 =
	uint!(0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001_U256);

const FIELD_ELEMENT_BYTES: usize = 32;

/// Percentage applied to the blob fee so the transaction can replace an
/// earlier one from the same sender.
const BLOB_FEE_BUMP_PERCENT: u128 = 110;

/// Sidecar plus the versioned hashes that commit to it.
#[derive(Debug, Clone)]
pub struct BlobBundle {
	pub sidecar: BlobTransactionSidecar,
	pub versioned_hashes: Vec<B256>,
}

/// Big-endian encoding of a uniformly random field element.
pub fn random_field_element<R: RngCore + ?Sized>(rng: &mut R) -> [u8; FIELD_ELEMENT_BYTES] {
	let mut bytes = [0u8; FIELD_ELEMENT_BYTES];
	loop {
		rng.fill_bytes(&mut bytes);
		if U256::from_be_bytes(bytes) < BLS_MODULUS {
			return bytes;
		}
	}
}

/// A blob filled with random field elements.
pub fn random_blob<R: RngCore + ?Sized>(rng: &mut R) -> Blob {
	let mut bytes = vec![0u8; BYTES_PER_BLOB];
	for chunk in bytes.chunks_exact_mut(FIELD_ELEMENT_BYTES) {
		chunk.copy_from_slice(&random_field_element(rng));
	}
	Blob::from_slice(&bytes)
}

fn kzg_error(e: c_kzg::Error) -> BuildError {
	BuildError::Kzg(e.to_string())
}

/// Generates `count` random blobs with their KZG commitments and proofs.
pub fn random_blob_bundle<R: RngCore + ?Sized>(
	count: usize,
	rng: &mut R,
) -> Result<BlobBundle, BuildError> {
	let settings = EnvKzgSettings::Default.get();
	let mut blobs = Vec::with_capacity(count);
	let mut commitments = Vec::with_capacity(count);
	let mut proofs = Vec::with_capacity(count);

	for _ in 0..count {
		let blob = random_blob(rng);
		let kzg_blob = c_kzg::Blob::from_bytes(blob.as_slice()).map_err(kzg_error)?;
		let commitment = settings
			.blob_to_kzg_commitment(&kzg_blob)
			.map_err(kzg_error)?
			.to_bytes();
		let proof = settings
			.compute_blob_kzg_proof(&kzg_blob, &commitment)
			.map_err(kzg_error)?
			.to_bytes();

		blobs.push(blob);
		commitments.push(Bytes48::from_slice(commitment.as_slice()));
		proofs.push(Bytes48::from_slice(proof.as_slice()));
	}

	let versioned_hashes = commitments
		.iter()
		.map(|commitment| kzg_to_versioned_hash(commitment.as_slice()))
		.collect();

	Ok(BlobBundle {
		sidecar: BlobTransactionSidecar::new(blobs, commitments, proofs),
		versioned_hashes,
	})
}

/// Max fee per blob gas for a transaction built on `header`.
///
/// Prices the next block's excess blob gas, adds one wei and applies a 10%
/// bump.
pub fn blob_fee_cap(header: &ChainHeader) -> Result<u128, BuildError> {
	let excess = header
		.excess_blob_gas
		.ok_or(BuildError::MissingHeaderField("excess_blob_gas"))?;
	let used = header
		.blob_gas_used
		.ok_or(BuildError::MissingHeaderField("blob_gas_used"))?;
	let price = calc_blob_gasprice(calc_excess_blob_gas(excess, used));
	Ok(price.saturating_add(1).saturating_mul(BLOB_FEE_BUMP_PERCENT) / 100)
}
