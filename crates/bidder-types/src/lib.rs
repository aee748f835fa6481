//! Shared types for the preconfirmation bidder.
//!
//! Everything that crosses a crate boundary lives here: the redacted secret
//! wrapper, the header snapshot read from the chain, the bid model and the
//! retry policy used by every connection path.

/// Bid model sent to the bidder node.
pub mod bid;
/// Header snapshot used to price and target transactions.
pub mod chain;
/// Retry policy shared by the connection manager.
pub mod retry;
/// Redacting wrapper for private keys.
pub mod secret_string;
/// Formatting helpers and unit constants.
pub mod utils;

pub use bid::{Bid, BidError, BidPayload, DecayWindow};
pub use chain::ChainHeader;
pub use retry::{RetryExhausted, RetryPolicy};
pub use secret_string::SecretString;
pub use utils::{mask_endpoint, truncate_id, without_0x_prefix, GWEI, WEI_PER_ETH};
