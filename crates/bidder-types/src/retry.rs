//! Retry policy for connection attempts.
//!
//! Bounded dial and subscribe paths retry with either exponential backoff
//! or a fixed delay. `RetryPolicy` captures the shape and drives the loop;
//! the sleep function is injectable so callers and tests control time.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Returned when a policy runs out of attempts.
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last_error}")]
pub struct RetryExhausted<E> {
	pub attempts: u32,
	pub last_error: E,
}

/// Attempt budget plus delay schedule.
///
/// The delay slept after failed attempt `n` (zero-based) is
/// `base_delay * multiplier^n`. No delay follows the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub multiplier: u32,
}

impl RetryPolicy {
	/// Doubling delay, `max_attempts` tries.
	pub const fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts,
			base_delay,
			multiplier: 2,
		}
	}

	/// Constant delay, `max_attempts` tries.
	pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
		Self {
			max_attempts,
			base_delay: delay,
			multiplier: 1,
		}
	}

	pub fn delay_after(&self, attempt: u32) -> Duration {
		self.base_delay
			.saturating_mul(self.multiplier.saturating_pow(attempt))
	}

	/// Runs `op` until it succeeds or the budget is spent, sleeping on the
	/// tokio timer between attempts.
	pub async fn run<T, E, F, Fut>(&self, op: F) -> Result<T, RetryExhausted<E>>
	where
		F: FnMut(u32) -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		self.run_with_sleep(op, tokio::time::sleep).await
	}

	/// Same as [`RetryPolicy::run`] with a caller-supplied sleep.
	///
	/// `op` receives the zero-based attempt index.
	pub async fn run_with_sleep<T, E, F, Fut, S, SFut>(
		&self,
		mut op: F,
		mut sleep: S,
	) -> Result<T, RetryExhausted<E>>
	where
		F: FnMut(u32) -> Fut,
		Fut: Future<Output = Result<T, E>>,
		S: FnMut(Duration) -> SFut,
		SFut: Future<Output = ()>,
	{
		let mut attempt: u32 = 0;
		loop {
			match op(attempt).await {
				Ok(value) => return Ok(value),
				Err(last_error) => {
					let attempts = attempt.saturating_add(1);
					if attempts >= self.max_attempts {
						return Err(RetryExhausted {
							attempts,
							last_error,
						});
					}
					sleep(self.delay_after(attempt)).await;
					attempt = attempts;
				},
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::{Cell, RefCell};

	#[tokio::test]
	async fn test_exponential_schedule_and_exhaustion() {
		let policy = RetryPolicy::exponential(5, Duration::from_secs(10));
		let slept = RefCell::new(Vec::new());
		let calls = Cell::new(0u32);

		let result: Result<(), _> = policy
			.run_with_sleep(
				|_| {
					calls.set(calls.get() + 1);
					std::future::ready(Err("dial failed"))
				},
				|delay| {
					slept.borrow_mut().push(delay);
					std::future::ready(())
				},
			)
			.await;

		let err = result.unwrap_err();
		assert_eq!(err.attempts, 5);
		assert_eq!(err.last_error, "dial failed");
		assert_eq!(calls.get(), 5);
		assert_eq!(
			*slept.borrow(),
			vec![10, 20, 40, 80]
				.into_iter()
				.map(Duration::from_secs)
				.collect::<Vec<_>>()
		);
	}

	#[tokio::test]
	async fn test_success_stops_retrying() {
		let policy = RetryPolicy::fixed(10, Duration::from_secs(5));
		let slept = Cell::new(0u32);

		let value = policy
			.run_with_sleep(
				|attempt| std::future::ready(if attempt < 3 { Err(attempt) } else { Ok(attempt) }),
				|delay| {
					assert_eq!(delay, Duration::from_secs(5));
					slept.set(slept.get() + 1);
					std::future::ready(())
				},
			)
			.await
			.unwrap();

		assert_eq!(value, 3);
		assert_eq!(slept.get(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_run_sleeps_on_tokio_timer() {
		let policy = RetryPolicy::fixed(30, Duration::from_secs(10));
		let started = tokio::time::Instant::now();

		let value = policy
			.run(|attempt| async move {
				if attempt < 25 {
					Err("endpoint down")
				} else {
					Ok(attempt)
				}
			})
			.await
			.unwrap();

		assert_eq!(value, 25);
		assert_eq!(started.elapsed(), Duration::from_secs(250));
	}

	#[test]
	fn test_delay_saturates() {
		let policy = RetryPolicy::exponential(u32::MAX, Duration::from_secs(10));
		assert_eq!(policy.delay_after(0), Duration::from_secs(10));
		assert_eq!(policy.delay_after(3), Duration::from_secs(80));
		assert_eq!(policy.delay_after(200), Duration::from_secs(10).saturating_mul(u32::MAX));
	}
}
