//! Command-line surface of the bidder.
//!
//! Every setting can also come from the environment (and therefore from a
//! `.env` file). Flags left unset fall through to the TOML file and then to
//! the defaults in `bidder-config`.

use bidder_config::Config;
use bidder_types::SecretString;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
	#[default]
	Text,
	Json,
}

/// Command-line arguments for the bidder.
#[derive(Parser, Debug, Default)]
#[command(author, about = "Places preconfirmation bids for every new block", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Args {
	/// Optional TOML configuration file
	#[arg(short, long)]
	pub config: Option<PathBuf>,

	/// Path to .env file
	#[arg(long = "env", env = "ENV_FILE")]
	pub env_file: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	pub log_level: String,

	/// Log output format
	#[arg(long, value_enum, default_value_t = LogFormat::Text)]
	pub log_format: LogFormat,

	/// Address of the bidder node gRPC API
	#[arg(long, env = "SERVER_ADDRESS")]
	pub server_address: Option<String>,

	/// Put signed transactions in the bid instead of relaying them
	#[arg(long, env = "USE_PAYLOAD", action = ArgAction::Set)]
	pub use_payload: Option<bool>,

	/// RPC endpoint, used for bundles when use-payload is false
	#[arg(long, env = "RPC_ENDPOINT")]
	pub rpc_endpoint: Option<String>,

	/// WebSocket endpoint for new headers
	#[arg(long, env = "WS_ENDPOINT")]
	pub ws_endpoint: Option<String>,

	/// Private key for signing transactions
	#[arg(long, env = "PRIVATE_KEY", hide = true, hide_env_values = true)]
	pub private_key: Option<String>,

	/// How many blocks ahead to bid for
	#[arg(long, env = "OFFSET")]
	pub offset: Option<u64>,

	/// Amount to bid in ETH
	#[arg(long, env = "BID_AMOUNT")]
	pub bid_amount: Option<f64>,

	/// Standard deviation of the bid as a percentage of the amount
	#[arg(long = "bid-amount-std-dev-percentage", env = "BID_AMOUNT_STD_DEV_PERCENTAGE")]
	pub bid_amount_std_dev_percentage: Option<f64>,

	/// Number of blobs to send (0 for an ETH transfer)
	#[arg(long, env = "NUM_BLOB")]
	pub num_blob: Option<usize>,

	/// Priority fee in wei
	#[arg(long, env = "PRIORITY_FEE")]
	pub priority_fee: Option<u128>,

	/// Default timeout in seconds
	#[arg(long, env = "DEFAULT_TIMEOUT")]
	pub default_timeout: Option<u64>,

	/// Minutes to run before stopping (0 runs until interrupted)
	#[arg(long, env = "RUN_DURATION_MINUTES")]
	pub run_duration_minutes: Option<u64>,

	/// Application name, for logging
	#[arg(long, env = "APP_NAME")]
	pub app_name: Option<String>,

	/// Application version, for logging
	#[arg(long = "version", env = "VERSION")]
	pub app_version: Option<String>,
}

impl Args {
	/// Overlays every flag that was set onto `config`.
	pub fn apply(&self, config: &mut Config) {
		let bidder = &mut config.bidder;
		if let Some(address) = &self.server_address {
			bidder.server_address = address.clone();
		}
		if let Some(use_payload) = self.use_payload {
			bidder.use_payload = use_payload;
		}
		if let Some(offset) = self.offset {
			bidder.block_offset = offset;
		}
		if let Some(amount) = self.bid_amount {
			bidder.bid_amount_eth = amount;
		}
		if let Some(percent) = self.bid_amount_std_dev_percentage {
			bidder.bid_std_dev_percent = percent;
		}
		if let Some(count) = self.num_blob {
			bidder.num_blobs = count;
		}
		if let Some(fee) = self.priority_fee {
			bidder.priority_fee_wei = fee;
		}
		if let Some(minutes) = self.run_duration_minutes {
			bidder.run_duration_minutes = minutes;
		}
		if let Some(name) = &self.app_name {
			bidder.app_name = name.clone();
		}
		if let Some(version) = &self.app_version {
			bidder.version = version.clone();
		}

		if let Some(rpc) = &self.rpc_endpoint {
			config.endpoints.rpc = rpc.clone();
		}
		if let Some(ws) = &self.ws_endpoint {
			config.endpoints.ws = ws.clone();
		}
		if let Some(secs) = self.default_timeout {
			config.timeouts.default_secs = secs;
		}
		if let Some(key) = &self.private_key {
			config.account.private_key = Some(SecretString::from(key.as_str()));
		}
	}
}
