//! Websocket header subscriptions over alloy.

use crate::{ChainConnector, HeaderSource, HeaderStream, SubscriptionError};
use alloy_provider::Provider;
use async_trait::async_trait;
use bidder_delivery::implementations::evm::alloy::header_snapshot;
use bidder_delivery::AlloyChain;
use futures::StreamExt;
use std::sync::Arc;

#[async_trait]
impl HeaderSource for AlloyChain {
	async fn subscribe_headers(&self) -> Result<HeaderStream, SubscriptionError> {
		let subscription = self
			.provider()
			.subscribe_blocks()
			.await
			.map_err(|e| SubscriptionError::Subscribe(e.to_string()))?;
		Ok(subscription
			.into_stream()
			.map(|header| header_snapshot(&header))
			.boxed())
	}
}

/// Connector that dials websocket endpoints with alloy.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl ChainConnector for WsConnector {
	async fn connect(&self, endpoint: &str) -> Result<Arc<dyn HeaderSource>, SubscriptionError> {
		let chain = AlloyChain::connect(endpoint)
			.await
			.map_err(|e| SubscriptionError::Connection(e.to_string()))?;
		Ok(Arc::new(chain))
	}
}
