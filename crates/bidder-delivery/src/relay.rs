//! Bundle relay client.
//!
//! When bids reference transactions by hash, the transactions themselves
//! must reach builders some other way. The relay accepts them through the
//! `eth_sendBundle` JSON-RPC method, targeted at a single block.

use alloy_primitives::Bytes;
use async_trait::async_trait;
use bidder_types::mask_endpoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the relay.
#[derive(Debug, Error)]
pub enum RelayError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Relay error {code}: {message}")]
	Rpc { code: i64, message: String },
	#[error("Invalid relay response: {0}")]
	InvalidResponse(String),
}

/// Destination for signed transactions sent outside the bid.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BundleRelay: Send + Sync {
	/// Submits EIP-2718 encoded transactions for inclusion in `block_number`.
	///
	/// Returns the relay's `result` field unchanged.
	async fn send_bundle(
		&self,
		transactions: Vec<Bytes>,
		block_number: u64,
	) -> Result<Value, RelayError>;
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<P> {
	jsonrpc: &'static str,
	id: u64,
	method: &'static str,
	params: P,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendBundleParams {
	txs: Vec<Bytes>,
	block_number: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
	code: i64,
	message: String,
}

fn send_bundle_request(
	transactions: Vec<Bytes>,
	block_number: u64,
) -> JsonRpcRequest<[SendBundleParams; 1]> {
	JsonRpcRequest {
		jsonrpc: "2.0",
		id: 1,
		method: "eth_sendBundle",
		params: [SendBundleParams {
			txs: transactions,
			block_number: format!("{block_number:#x}"),
		}],
	}
}

/// JSON-RPC relay reached over HTTP.
#[derive(Debug, Clone)]
pub struct RelayClient {
	client: reqwest::Client,
	endpoint: String,
}

impl RelayClient {
	pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| RelayError::Network(e.to_string()))?;
		Ok(Self {
			client,
			endpoint: endpoint.into(),
		})
	}
}

#[async_trait]
impl BundleRelay for RelayClient {
	async fn send_bundle(
		&self,
		transactions: Vec<Bytes>,
		block_number: u64,
	) -> Result<Value, RelayError> {
		let request = send_bundle_request(transactions, block_number);
		let response: JsonRpcResponse = self
			.client
			.post(&self.endpoint)
			.json(&request)
			.send()
			.await
			.map_err(|e| {
				RelayError::Network(format!(
					"{}: {}",
					mask_endpoint(&self.endpoint),
					e.without_url()
				))
			})?
			.json()
			.await
			.map_err(|e| RelayError::InvalidResponse(e.without_url().to_string()))?;

		if let Some(error) = response.error {
			return Err(RelayError::Rpc {
				code: error.code,
				message: error.message,
			});
		}
		response
			.result
			.ok_or_else(|| RelayError::InvalidResponse("missing result".into()))
	}
}
