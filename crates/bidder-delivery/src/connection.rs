//! RPC connection with bounded exponential backoff.

use crate::{AlloyChain, ChainError};
use bidder_types::{mask_endpoint, RetryPolicy};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// First backoff delay; doubles after every failed attempt.
pub const RPC_RETRY_BASE_DELAY: Duration = Duration::from_secs(10);

/// Dials `endpoint`, retrying up to `max_attempts` times with a
/// `10s * 2^attempt` delay between tries.
///
/// Each attempt is bounded by `attempt_timeout`. Returns `None` when every
/// attempt fails; the caller decides whether that is fatal.
pub async fn connect_with_retries(
	endpoint: &str,
	max_attempts: u32,
	attempt_timeout: Duration,
) -> Option<AlloyChain> {
	dial_with_retries(
		RetryPolicy::exponential(max_attempts, RPC_RETRY_BASE_DELAY),
		endpoint,
		attempt_timeout,
		|| AlloyChain::connect(endpoint),
	)
	.await
}

/// Retry loop behind [`connect_with_retries`] with the dial step supplied
/// by the caller.
pub async fn dial_with_retries<T, F, Fut>(
	policy: RetryPolicy,
	endpoint: &str,
	attempt_timeout: Duration,
	mut dial: F,
) -> Option<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, ChainError>>,
{
	let masked = mask_endpoint(endpoint);
	let outcome = policy
		.run(|attempt| {
			let connecting = dial();
			let masked = &masked;
			async move {
				let result = match tokio::time::timeout(attempt_timeout, connecting).await {
					Ok(result) => result,
					Err(_) => Err(ChainError::Timeout(attempt_timeout)),
				};
				if let Err(e) = &result {
					warn!(
						endpoint = %masked,
						attempt = attempt + 1,
						error = %e,
						"Failed to connect to RPC endpoint"
					);
				}
				result
			}
		})
		.await;

	match outcome {
		Ok(client) => {
			info!(endpoint = %masked, "Connected to RPC endpoint");
			Some(client)
		},
		Err(exhausted) => {
			error!(
				endpoint = %masked,
				attempts = exhausted.attempts,
				error = %exhausted.last_error,
				"Giving up on RPC endpoint"
			);
			None
		},
	}
}
