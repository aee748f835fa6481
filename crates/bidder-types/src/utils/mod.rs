//! Utility helpers shared by the bidder crates.

pub mod constants;
pub mod formatting;

pub use constants::{GWEI, WEI_PER_ETH};
pub use formatting::{mask_endpoint, truncate_id, without_0x_prefix};
