//! Unit constants.

/// One gwei in wei.
pub const GWEI: u64 = 1_000_000_000;

/// One ether in wei.
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;
