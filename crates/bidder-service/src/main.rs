//! Main entry point for the preconfirmation bidder.
//!
//! Loads configuration, subscribes to new headers and places one bid per
//! block until interrupted, the run duration elapses or the subscription
//! cannot be restored.

use args::{Args, LogFormat};
use bidder_config::{load_env_file, Config, ConfigError};
use bidder_core::BidderBuilder;
use bidder_types::mask_endpoint;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::Instrument;

mod args;

const DEFAULT_ENV_FILE: &str = ".env";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// The .env file feeds clap's env fallbacks, so it is loaded before the
	// final parse.
	let args = Args::parse();
	let env_loaded = load_env(args.env_file.as_deref());
	let args = if matches!(env_loaded, Ok(true)) {
		Args::parse()
	} else {
		args
	};

	init_tracing(&args);
	match &env_loaded {
		Ok(true) => tracing::debug!("Loaded .env file"),
		Ok(false) => {
			if let Some(path) = &args.env_file {
				tracing::warn!(path = %path.display(), "Env file not found");
			}
		},
		Err(e) => tracing::warn!(error = %e, "Failed to load env file"),
	}

	let config = load_config(&args).inspect_err(|e| {
		tracing::error!(error = %e, "Invalid configuration");
	})?;

	let span = tracing::info_span!(
		"bidder",
		app = %config.bidder.app_name,
		version = %config.bidder.version
	);
	run(config).instrument(span).await
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
	println!("{}", render_summary(&config));
	log_configuration(&config);

	let engine = BidderBuilder::new(config).build().await.inspect_err(|e| {
		tracing::error!(error = %e, "Failed to start bidder");
	})?;

	let summary = engine.run().await.inspect_err(|e| {
		tracing::error!(error = %e, "Bidder stopped");
	})?;
	tracing::info!(
		headers_processed = summary.headers_processed,
		bids_submitted = summary.bids_submitted,
		stop_reason = ?summary.stop_reason,
		"Stopped bidder"
	);
	Ok(())
}

fn load_env(path: Option<&Path>) -> Result<bool, ConfigError> {
	let path = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
	load_env_file(path)
}

/// Defaults, then the TOML file, then flags and environment.
fn load_config(args: &Args) -> Result<Config, ConfigError> {
	let mut config = match &args.config {
		Some(path) => Config::from_file(path)?,
		None => Config::default(),
	};
	args.apply(&mut config);
	config.validated()
}

fn init_tracing(args: &Args) {
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	let builder = fmt().with_env_filter(env_filter).with_target(true);
	match args.log_format {
		LogFormat::Json => builder.json().init(),
		LogFormat::Text => builder.with_thread_ids(true).init(),
	}
}

fn render_summary(config: &Config) -> String {
	let bidder = &config.bidder;
	let run_duration = match bidder.run_duration_minutes {
		0 => "infinite".to_string(),
		minutes => format!("{minutes} minutes"),
	};
	let lines = [
		"-----------------------------------------------------------------------------------------------".to_string(),
		"Welcome to Preconf Bidder!".to_string(),
		String::new(),
		"Configuration:".to_string(),
		format!(" - WebSocket Endpoint: {}", mask_endpoint(&config.endpoints.ws)),
		" - Private Key: Provided (hidden)".to_string(),
		format!(" - Server Address: {}", bidder.server_address),
		format!(" - Use Payload: {}", bidder.use_payload),
		format!(" - Block Offset: {}", bidder.block_offset),
		format!(" - Bid Amount: {:.6} ETH", bidder.bid_amount_eth),
		format!(" - Priority Fee: {} wei", bidder.priority_fee_wei),
		format!(" - Standard Deviation: {:.6}%", bidder.bid_std_dev_percent),
		format!(" - Number of Blobs: {}", bidder.num_blobs),
		format!(" - Default Timeout: {} seconds", config.timeouts.default_secs),
		format!(" - Run Duration: {run_duration}"),
		"-----------------------------------------------------------------------------------------------".to_string(),
	];
	lines.join("\n")
}

fn log_configuration(config: &Config) {
	let bidder = &config.bidder;
	match bidder.run_duration_minutes {
		0 => tracing::info!("Bidder will run indefinitely"),
		minutes => tracing::info!(run_duration_minutes = minutes, "Bidder will run for a fixed duration"),
	}
	tracing::info!(
		server_address = %bidder.server_address,
		rpc_endpoint = %mask_endpoint(&config.endpoints.rpc),
		ws_endpoint = %mask_endpoint(&config.endpoints.ws),
		offset = bidder.block_offset,
		use_payload = bidder.use_payload,
		bid_amount_eth = bidder.bid_amount_eth,
		priority_fee_wei = %bidder.priority_fee_wei,
		std_dev_percent = bidder.bid_std_dev_percent,
		num_blobs = bidder.num_blobs,
		private_key_provided = config.account.private_key.is_some(),
		default_timeout_secs = config.timeouts.default_secs,
		"Configuration values"
	);
}
