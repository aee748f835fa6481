//! Builder for valid configurations in tests.

use crate::{AccountConfig, BidderConfig, Config, EndpointsConfig, TimeoutsConfig};
use bidder_types::SecretString;

/// Well-known development key (anvil account 0).
pub const TEST_PRIVATE_KEY: &str =
	"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Fluent builder starting from defaults plus a usable private key.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	bidder: BidderConfig,
	endpoints: EndpointsConfig,
	timeouts: TimeoutsConfig,
	private_key: Option<SecretString>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	pub fn new() -> Self {
		Self {
			bidder: BidderConfig::default(),
			endpoints: EndpointsConfig {
				rpc: "http://127.0.0.1:8545".to_string(),
				ws: "ws://127.0.0.1:8546".to_string(),
			},
			timeouts: TimeoutsConfig::default(),
			private_key: Some(SecretString::from(TEST_PRIVATE_KEY)),
		}
	}

	pub fn private_key(mut self, key: &str) -> Self {
		self.private_key = Some(SecretString::from(key));
		self
	}

	pub fn use_payload(mut self, use_payload: bool) -> Self {
		self.bidder.use_payload = use_payload;
		self
	}

	pub fn block_offset(mut self, offset: u64) -> Self {
		self.bidder.block_offset = offset;
		self
	}

	pub fn bid_amount_eth(mut self, amount: f64) -> Self {
		self.bidder.bid_amount_eth = amount;
		self
	}

	pub fn bid_std_dev_percent(mut self, percent: f64) -> Self {
		self.bidder.bid_std_dev_percent = percent;
		self
	}

	pub fn num_blobs(mut self, count: usize) -> Self {
		self.bidder.num_blobs = count;
		self
	}

	pub fn priority_fee_wei(mut self, fee: u128) -> Self {
		self.bidder.priority_fee_wei = fee;
		self
	}

	pub fn decay_duration_ms(mut self, duration: u64) -> Self {
		self.bidder.decay_duration_ms = duration;
		self
	}

	pub fn run_duration_minutes(mut self, minutes: u64) -> Self {
		self.bidder.run_duration_minutes = minutes;
		self
	}

	pub fn ws_endpoint(mut self, endpoint: &str) -> Self {
		self.endpoints.ws = endpoint.to_string();
		self
	}

	pub fn rpc_endpoint(mut self, endpoint: &str) -> Self {
		self.endpoints.rpc = endpoint.to_string();
		self
	}

	pub fn resubscribe_attempts(mut self, attempts: u32) -> Self {
		self.timeouts.resubscribe_attempts = attempts;
		self
	}

	pub fn build(self) -> Config {
		Config {
			bidder: self.bidder,
			endpoints: self.endpoints,
			timeouts: self.timeouts,
			account: AccountConfig {
				private_key: self.private_key,
			},
		}
	}
}
