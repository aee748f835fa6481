//! Core bidding engine.
//!
//! Wires the account, chain access, transaction building, pricing and bid
//! submission crates into a single loop driven by new block headers. For
//! every header the engine builds one self-addressed transaction targeting
//! a block a configurable distance ahead, prices a bid for it, and submits
//! that bid to the bidder node.

pub mod builder;
pub mod engine;
pub mod handlers;

pub use builder::{BidderBuilder, BuilderError};
pub use engine::{BidderEngine, EngineError, RunSummary, StopReason};
pub use handlers::{HandledHeader, HandlerError, HeaderHandler};
