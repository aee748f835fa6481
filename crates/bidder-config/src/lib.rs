//! Configuration for the preconfirmation bidder.
//!
//! Settings come from four layers, highest precedence first: command-line
//! flags, process environment, a `.env` file, and an optional TOML file.
//! Anything left unset falls back to the defaults declared here. The service
//! binary merges the layers; this crate owns the shape, the defaults, TOML
//! loading with `${VAR:-default}` substitution, and validation.
//!
//! Once validated, a `Config` is shared read-only behind an `Arc`.

mod env_file;

#[cfg(any(test, feature = "testing"))]
pub mod builders {
	pub mod config;
}

pub use env_file::load_env_file;

use bidder_types::{without_0x_prefix, SecretString};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level bidder configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	#[serde(default)]
	pub bidder: BidderConfig,
	#[serde(default)]
	pub endpoints: EndpointsConfig,
	#[serde(default)]
	pub timeouts: TimeoutsConfig,
	#[serde(default)]
	pub account: AccountConfig,
}

/// Bidding behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BidderConfig {
	/// host:port of the bidder node's gRPC API.
	#[serde(default = "default_server_address")]
	pub server_address: String,
	/// Send signed transactions inside the bid. When false, transactions go
	/// to the relay and the bid references them by hash.
	#[serde(default = "default_use_payload")]
	pub use_payload: bool,
	/// Blocks ahead of the latest header to target.
	#[serde(default = "default_block_offset")]
	pub block_offset: u64,
	/// Mean bid in ETH. Also the floor: sampled bids never go below it.
	#[serde(default = "default_bid_amount_eth")]
	pub bid_amount_eth: f64,
	/// Standard deviation of the bid as a percentage of the mean.
	#[serde(default = "default_bid_std_dev_percent")]
	pub bid_std_dev_percent: f64,
	/// Zero sends a plain self-transfer, anything else a blob transaction.
	#[serde(default)]
	pub num_blobs: usize,
	#[serde(default = "default_priority_fee_wei")]
	pub priority_fee_wei: u128,
	#[serde(default = "default_decay_duration_ms")]
	pub decay_duration_ms: u64,
	/// Zero runs until interrupted.
	#[serde(default)]
	pub run_duration_minutes: u64,
	#[serde(default = "default_app_name")]
	pub app_name: String,
	#[serde(default = "default_version")]
	pub version: String,
}

/// Execution-layer endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
	/// HTTP JSON-RPC endpoint, used for bundle submission.
	#[serde(default = "default_rpc_endpoint")]
	pub rpc: String,
	/// Websocket endpoint for header subscriptions and chain reads.
	#[serde(default = "default_ws_endpoint")]
	pub ws: String,
}

/// Timeouts and retry budgets.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutsConfig {
	/// Applied to each group of chain reads and to each dial attempt.
	#[serde(default = "default_timeout_secs")]
	pub default_secs: u64,
	#[serde(default = "default_rpc_connect_attempts")]
	pub rpc_connect_attempts: u32,
	#[serde(default = "default_reconnect_delay_secs")]
	pub reconnect_delay_secs: u64,
	#[serde(default = "default_resubscribe_attempts")]
	pub resubscribe_attempts: u32,
	#[serde(default = "default_resubscribe_delay_secs")]
	pub resubscribe_delay_secs: u64,
}

/// Signing key.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountConfig {
	pub private_key: Option<SecretString>,
}

fn default_server_address() -> String {
	"localhost:13524".to_string()
}

fn default_use_payload() -> bool {
	true
}

fn default_block_offset() -> u64 {
	1
}

fn default_bid_amount_eth() -> f64 {
	0.001
}

fn default_bid_std_dev_percent() -> f64 {
	100.0
}

fn default_priority_fee_wei() -> u128 {
	1
}

fn default_decay_duration_ms() -> u64 {
	36_000
}

fn default_app_name() -> String {
	"preconf_bidder".to_string()
}

fn default_version() -> String {
	"0.8.0".to_string()
}

fn default_rpc_endpoint() -> String {
	"https://ethereum-holesky-rpc.publicnode.com".to_string()
}

fn default_ws_endpoint() -> String {
	"wss://ethereum-holesky-rpc.publicnode.com".to_string()
}

fn default_timeout_secs() -> u64 {
	15
}

fn default_rpc_connect_attempts() -> u32 {
	5
}

fn default_reconnect_delay_secs() -> u64 {
	10
}

fn default_resubscribe_attempts() -> u32 {
	10
}

fn default_resubscribe_delay_secs() -> u64 {
	5
}

impl Default for BidderConfig {
	fn default() -> Self {
		Self {
			server_address: default_server_address(),
			use_payload: default_use_payload(),
			block_offset: default_block_offset(),
			bid_amount_eth: default_bid_amount_eth(),
			bid_std_dev_percent: default_bid_std_dev_percent(),
			num_blobs: 0,
			priority_fee_wei: default_priority_fee_wei(),
			decay_duration_ms: default_decay_duration_ms(),
			run_duration_minutes: 0,
			app_name: default_app_name(),
			version: default_version(),
		}
	}
}

impl Default for EndpointsConfig {
	fn default() -> Self {
		Self {
			rpc: default_rpc_endpoint(),
			ws: default_ws_endpoint(),
		}
	}
}

impl Default for TimeoutsConfig {
	fn default() -> Self {
		Self {
			default_secs: default_timeout_secs(),
			rpc_connect_attempts: default_rpc_connect_attempts(),
			reconnect_delay_secs: default_reconnect_delay_secs(),
			resubscribe_attempts: default_resubscribe_attempts(),
			resubscribe_delay_secs: default_resubscribe_delay_secs(),
		}
	}
}

impl TimeoutsConfig {
	pub fn default_timeout(&self) -> Duration {
		Duration::from_secs(self.default_secs)
	}

	pub fn reconnect_delay(&self) -> Duration {
		Duration::from_secs(self.reconnect_delay_secs)
	}

	pub fn resubscribe_delay(&self) -> Duration {
		Duration::from_secs(self.resubscribe_delay_secs)
	}
}

/// Longest accepted `run_duration_minutes`: one leap year.
pub const MAX_RUN_DURATION_MINUTES: u64 = 366 * 24 * 60;

impl BidderConfig {
	/// `None` when the bidder should run until interrupted.
	pub fn run_duration(&self) -> Option<Duration> {
		match self.run_duration_minutes {
			0 => None,
			minutes => Some(Duration::from_secs(minutes.saturating_mul(60))),
		}
	}
}

impl Config {
	/// Reads a TOML file, substituting environment references.
	///
	/// The result is not validated; callers apply their overrides first and
	/// then call [`Config::validated`].
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Normalizes endpoints and checks every setting the bidder relies on.
	pub fn validated(mut self) -> Result<Self, ConfigError> {
		self.endpoints.ws = normalize_ws_endpoint(&self.endpoints.ws)?;

		match &self.account.private_key {
			None => {
				return Err(ConfigError::Validation(
					"private key is required (set PRIVATE_KEY)".into(),
				))
			},
			Some(key) if key.is_empty() => {
				return Err(ConfigError::Validation(
					"private key is required (set PRIVATE_KEY)".into(),
				))
			},
			Some(key) => validate_private_key(key)?,
		}

		let bidder = &self.bidder;
		if bidder.server_address.trim().is_empty() {
			return Err(ConfigError::Validation(
				"server address cannot be empty".into(),
			));
		}
		if !bidder.use_payload && self.endpoints.rpc.trim().is_empty() {
			return Err(ConfigError::Validation(
				"rpc endpoint is required when use_payload is false".into(),
			));
		}
		if !bidder.bid_amount_eth.is_finite() || bidder.bid_amount_eth <= 0.0 {
			return Err(ConfigError::Validation(format!(
				"bid amount must be a positive number of ETH, got {}",
				bidder.bid_amount_eth
			)));
		}
		if !bidder.bid_std_dev_percent.is_finite() || bidder.bid_std_dev_percent < 0.0 {
			return Err(ConfigError::Validation(format!(
				"bid standard deviation percentage cannot be negative, got {}",
				bidder.bid_std_dev_percent
			)));
		}
		if bidder.run_duration_minutes > MAX_RUN_DURATION_MINUTES {
			return Err(ConfigError::Validation(format!(
				"run duration cannot exceed {MAX_RUN_DURATION_MINUTES} minutes, got {}",
				bidder.run_duration_minutes
			)));
		}
		if bidder.decay_duration_ms == 0 {
			return Err(ConfigError::Validation(
				"decay duration must be greater than 0".into(),
			));
		}
		if self.timeouts.default_secs == 0 {
			return Err(ConfigError::Validation(
				"default timeout must be greater than 0".into(),
			));
		}
		if self.timeouts.rpc_connect_attempts == 0 || self.timeouts.resubscribe_attempts == 0 {
			return Err(ConfigError::Validation(
				"retry attempt budgets must be at least 1".into(),
			));
		}

		Ok(self)
	}

	/// The validated private key.
	pub fn private_key(&self) -> Result<&SecretString, ConfigError> {
		self.account
			.private_key
			.as_ref()
			.ok_or_else(|| ConfigError::Validation("private key is required".into()))
	}
}

/// Parses TOML after resolving `${VAR}` and `${VAR:-default}` references.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		Ok(toml::from_str(&resolved)?)
	}
}

/// Replaces `${VAR}` and `${VAR:-default}` with values from the environment.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes",
			input.len()
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures<'_>| {
		let name = &caps[1];
		match (std::env::var(name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(name) => Err(ConfigError::Validation(format!(
			"Environment variable '{name}' not found"
		))),
		None => Ok(resolved.into_owned()),
	}
}

/// Adds a `ws://` scheme when none is given and checks the result is a
/// websocket URL with a host.
pub fn normalize_ws_endpoint(raw: &str) -> Result<String, ConfigError> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Err(ConfigError::Validation(
			"websocket endpoint is required (set WS_ENDPOINT)".into(),
		));
	}

	let candidate = if trimmed.contains("://") {
		trimmed.to_string()
	} else {
		format!("ws://{trimmed}")
	};

	let url = Url::parse(&candidate)
		.map_err(|e| ConfigError::Validation(format!("invalid websocket endpoint: {e}")))?;
	if !matches!(url.scheme(), "ws" | "wss") {
		return Err(ConfigError::Validation(format!(
			"websocket endpoint must use ws or wss, got {}",
			url.scheme()
		)));
	}
	if url.host_str().is_none_or(str::is_empty) {
		return Err(ConfigError::Validation(
			"websocket endpoint has no host".into(),
		));
	}

	Ok(candidate)
}

/// A private key is 32 bytes of hex, optionally "0x"-prefixed.
pub fn validate_private_key(key: &SecretString) -> Result<(), ConfigError> {
	key.with_exposed(|raw| {
		let hex = without_0x_prefix(raw.trim());
		if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
			return Err(ConfigError::Validation(
				"private key must be 64 hex characters".into(),
			));
		}
		Ok(())
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builders::config::ConfigBuilder;
	use std::io::Write;

	const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe512961708279f3c1a5b8e3a2f3e1a0";

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.bidder.server_address, "localhost:13524");
		assert!(config.bidder.use_payload);
		assert_eq!(config.bidder.block_offset, 1);
		assert_eq!(config.bidder.bid_amount_eth, 0.001);
		assert_eq!(config.bidder.bid_std_dev_percent, 100.0);
		assert_eq!(config.bidder.num_blobs, 0);
		assert_eq!(config.bidder.priority_fee_wei, 1);
		assert_eq!(config.bidder.decay_duration_ms, 36_000);
		assert_eq!(config.bidder.run_duration(), None);
		assert_eq!(config.bidder.app_name, "preconf_bidder");
		assert_eq!(config.bidder.version, "0.8.0");
		assert_eq!(config.timeouts.default_timeout(), Duration::from_secs(15));
		assert_eq!(
			config.endpoints.ws,
			"wss://ethereum-holesky-rpc.publicnode.com"
		);
	}

	#[test]
	fn test_partial_toml_keeps_defaults() {
		let config: Config = r#"
			[bidder]
			block_offset = 2
			num_blobs = 3

			[endpoints]
			ws = "wss://node.example.org/ws"
		"#
		.parse()
		.unwrap();

		assert_eq!(config.bidder.block_offset, 2);
		assert_eq!(config.bidder.num_blobs, 3);
		assert_eq!(config.bidder.decay_duration_ms, 36_000);
		assert_eq!(config.endpoints.ws, "wss://node.example.org/ws");
		assert_eq!(
			config.endpoints.rpc,
			"https://ethereum-holesky-rpc.publicnode.com"
		);
	}

	#[test]
	fn test_env_substitution_with_default() {
		std::env::set_var("BIDDER_CONFIG_TEST_KEY", KEY);
		let config: Config = r#"
			[account]
			private_key = "${BIDDER_CONFIG_TEST_KEY}"

			[bidder]
			server_address = "${BIDDER_CONFIG_TEST_UNSET_ADDR:-bidder.local:13524}"
		"#
		.parse()
		.unwrap();

		assert_eq!(config.private_key().unwrap().expose_secret(), KEY);
		assert_eq!(config.bidder.server_address, "bidder.local:13524");
	}

	#[test]
	fn test_env_substitution_missing_var() {
		let err = r#"
			[account]
			private_key = "${BIDDER_CONFIG_TEST_DEFINITELY_UNSET}"
		"#
		.parse::<Config>()
		.unwrap_err();
		assert!(err.to_string().contains("BIDDER_CONFIG_TEST_DEFINITELY_UNSET"));
	}

	#[test]
	fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[bidder]\nuse_payload = false\nbid_amount_eth = 0.5\n\n[timeouts]\ndefault_secs = 30"
		)
		.unwrap();

		let config = Config::from_file(file.path()).unwrap();
		assert!(!config.bidder.use_payload);
		assert_eq!(config.bidder.bid_amount_eth, 0.5);
		assert_eq!(config.timeouts.default_secs, 30);
	}

	#[test]
	fn test_validated_requires_private_key() {
		let mut config = ConfigBuilder::new().build();
		config.account.private_key = None;
		let err = config.validated().unwrap_err();
		assert!(err.to_string().contains("private key is required"));
	}

	#[test]
	fn test_validated_rejects_malformed_key() {
		let config = ConfigBuilder::new().private_key("0x1234").build();
		assert!(config.validated().is_err());

		let config = ConfigBuilder::new()
			.private_key(&"zz".repeat(32))
			.build();
		assert!(config.validated().is_err());
	}

	#[test]
	fn test_validated_accepts_unprefixed_key() {
		let config = ConfigBuilder::new()
			.private_key(without_0x_prefix(KEY))
			.build();
		assert!(config.validated().is_ok());
	}

	#[test]
	fn test_normalize_ws_endpoint() {
		assert_eq!(
			normalize_ws_endpoint("localhost:8546").unwrap(),
			"ws://localhost:8546"
		);
		assert_eq!(
			normalize_ws_endpoint(" wss://node.example.org ").unwrap(),
			"wss://node.example.org"
		);
		assert!(normalize_ws_endpoint("https://node.example.org").is_err());
		assert!(normalize_ws_endpoint("").is_err());
		assert!(normalize_ws_endpoint("ws://").is_err());
	}

	#[test]
	fn test_validated_rejects_bad_bid_parameters() {
		let config = ConfigBuilder::new().bid_amount_eth(0.0).build();
		assert!(config.validated().is_err());

		let config = ConfigBuilder::new().bid_std_dev_percent(-1.0).build();
		assert!(config.validated().is_err());

		let config = ConfigBuilder::new().decay_duration_ms(0).build();
		assert!(config.validated().is_err());
	}

	#[test]
	fn test_run_duration() {
		let config = ConfigBuilder::new().run_duration_minutes(2).build();
		assert_eq!(
			config.bidder.run_duration(),
			Some(Duration::from_secs(120))
		);
	}

	#[test]
	fn test_run_duration_saturates() {
		let config = ConfigBuilder::new().run_duration_minutes(u64::MAX).build();
		assert_eq!(
			config.bidder.run_duration(),
			Some(Duration::from_secs(u64::MAX))
		);
	}

	#[test]
	fn test_validated_bounds_run_duration() {
		let config = ConfigBuilder::new()
			.run_duration_minutes(MAX_RUN_DURATION_MINUTES)
			.build();
		assert!(config.validated().is_ok());

		let config = ConfigBuilder::new().run_duration_minutes(u64::MAX).build();
		let err = config.validated().unwrap_err();
		assert!(err.to_string().contains("run duration cannot exceed"));
	}

	#[test]
	fn test_debug_redacts_private_key() {
		let config = ConfigBuilder::new().private_key(KEY).build();
		let debug = format!("{config:?}");
		assert!(!debug.contains(without_0x_prefix(KEY)));
	}
}
