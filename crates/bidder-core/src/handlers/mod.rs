//! Per-event handlers invoked by the engine loop.

pub mod header;

pub use header::{HandledHeader, HandlerError, HeaderHandler};
