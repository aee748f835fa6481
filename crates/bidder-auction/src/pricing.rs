//! Bid pricing: decay windows and randomized bid amounts.
//!
//! Bids are drawn from a normal distribution centred on the configured
//! amount, then clamped so the configured amount is also the floor. The
//! draw is done in ETH as a float and converted to wei exactly through a
//! decimal, truncating any fraction of a wei.

use alloy_primitives::U256;
use bidder_types::DecayWindow;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use thiserror::Error;

const WEI_PER_ETH: i64 = 1_000_000_000_000_000_000;

/// Errors that can occur while pricing a bid.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
	#[error("Bid amount must be a positive number of ETH, got {0}")]
	InvalidAmount(f64),
	#[error("Standard deviation percentage must be non-negative, got {0}")]
	InvalidDeviation(f64),
	#[error("Cannot convert {0} ETH to wei")]
	Conversion(f64),
}

/// Decay window opening at `now_ms`.
pub fn decay_window(now_ms: i64, duration_ms: u64) -> DecayWindow {
	DecayWindow::starting_at(now_ms, duration_ms)
}

/// Decay window opening at the current wall-clock time.
pub fn current_decay_window(duration_ms: u64) -> DecayWindow {
	decay_window(chrono::Utc::now().timestamp_millis(), duration_ms)
}

/// Draws a bid in ETH from N(target, (target * pct / 100)^2), never below
/// `target_eth`.
pub fn sample_bid_amount_eth<R: Rng + ?Sized>(
	target_eth: f64,
	std_dev_percent: f64,
	rng: &mut R,
) -> Result<f64, PricingError> {
	if !target_eth.is_finite() || target_eth <= 0.0 {
		return Err(PricingError::InvalidAmount(target_eth));
	}
	if !std_dev_percent.is_finite() || std_dev_percent < 0.0 {
		return Err(PricingError::InvalidDeviation(std_dev_percent));
	}

	let std_dev = target_eth * std_dev_percent / 100.0;
	let normal = Normal::new(target_eth, std_dev)
		.map_err(|_| PricingError::InvalidDeviation(std_dev_percent))?;
	Ok(normal.sample(rng).max(target_eth))
}

/// Exact ETH to wei conversion; fractions of a wei are truncated.
pub fn eth_to_wei(eth: f64) -> Result<U256, PricingError> {
	let wei = Decimal::from_f64(eth)
		.and_then(|eth| eth.checked_mul(Decimal::from(WEI_PER_ETH)))
		.map(|wei| wei.trunc())
		.and_then(|wei| wei.to_u128())
		.ok_or(PricingError::Conversion(eth))?;
	Ok(U256::from(wei))
}

/// [`sample_bid_amount_eth`] converted to wei.
pub fn sample_bid_amount_wei<R: Rng + ?Sized>(
	target_eth: f64,
	std_dev_percent: f64,
	rng: &mut R,
) -> Result<U256, PricingError> {
	let eth = sample_bid_amount_eth(target_eth, std_dev_percent, rng)?;
	eth_to_wei(eth)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	#[test]
	fn test_one_eth_in_wei() {
		assert_eq!(
			eth_to_wei(1.0).unwrap().to_string(),
			"1000000000000000000"
		);
		assert_eq!(
			eth_to_wei(0.001).unwrap(),
			U256::from(1_000_000_000_000_000u64)
		);
	}

	#[test]
	fn test_conversion_truncates_sub_wei() {
		assert_eq!(eth_to_wei(1.5e-18).unwrap(), U256::from(1u64));
		assert_eq!(eth_to_wei(0.0).unwrap(), U256::ZERO);
	}

	#[test]
	fn test_conversion_rejects_unrepresentable() {
		assert!(eth_to_wei(-1.0).is_err());
		assert!(eth_to_wei(f64::NAN).is_err());
		assert!(eth_to_wei(f64::INFINITY).is_err());
	}

	#[test]
	fn test_samples_never_below_target() {
		let mut rng = StdRng::seed_from_u64(2024);
		let floor = eth_to_wei(0.001).unwrap();
		for _ in 0..5_000 {
			let wei = sample_bid_amount_wei(0.001, 100.0, &mut rng).unwrap();
			assert!(wei >= floor);
		}
	}

	#[test]
	fn test_wei_floor_holds_across_targets_and_deviations() {
		let mut rng = StdRng::seed_from_u64(0xb1d);
		for target in [1e-9, 1e-6, 1e-3, 0.5, 1.0, 37.25, 1e3] {
			let floor = eth_to_wei(target).unwrap();
			for std_dev in [0.0, 1.0, 50.0, 100.0, 1000.0] {
				for _ in 0..1_000 {
					let wei = sample_bid_amount_wei(target, std_dev, &mut rng).unwrap();
					assert!(
						wei >= floor,
						"target = {target}, std_dev = {std_dev}, wei = {wei}"
					);
				}
			}
		}
	}

	#[test]
	fn test_samples_spread_above_target() {
		let mut rng = StdRng::seed_from_u64(11);
		let samples: Vec<f64> = (0..2_000)
			.map(|_| sample_bid_amount_eth(1.0, 50.0, &mut rng).unwrap())
			.collect();
		assert!(samples.iter().all(|s| *s >= 1.0));
		let raised = samples.iter().filter(|s| **s > 1.0).count();
		// roughly half the draws land above the mean
		assert!(raised > 800 && raised < 1_200, "raised = {raised}");
	}

	#[test]
	fn test_zero_deviation_returns_target() {
		let mut rng = StdRng::seed_from_u64(5);
		assert_eq!(sample_bid_amount_eth(0.25, 0.0, &mut rng).unwrap(), 0.25);
	}

	#[test]
	fn test_invalid_inputs() {
		let mut rng = StdRng::seed_from_u64(5);
		assert_eq!(
			sample_bid_amount_eth(0.0, 10.0, &mut rng),
			Err(PricingError::InvalidAmount(0.0))
		);
		assert_eq!(
			sample_bid_amount_eth(1.0, -5.0, &mut rng),
			Err(PricingError::InvalidDeviation(-5.0))
		);
	}

	#[test]
	fn test_decay_window_width_is_constant() {
		for now in [0i64, 1_700_000_000_000, 1_700_000_012_345] {
			let window = decay_window(now, 36_000);
			assert_eq!(window.start_ms, now);
			assert_eq!(window.end_ms - window.start_ms, 36_000);
		}
	}

	#[test]
	fn test_current_decay_window_uses_wall_clock() {
		let before = chrono::Utc::now().timestamp_millis();
		let window = current_decay_window(12_000);
		let after = chrono::Utc::now().timestamp_millis();
		assert!(window.start_ms >= before && window.start_ms <= after);
		assert_eq!(window.duration_ms(), 12_000);
	}
}
