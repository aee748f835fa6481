// @generated
// This file is @generated by prost-build.
/// A bid for inclusion of one or more transactions in a specific block.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Bid {
    /// Hex transaction hashes without the 0x prefix.
    #[prost(string, repeated, tag = "1")]
    pub tx_hashes: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// Bid amount in wei, as a decimal string.
    #[prost(string, tag = "2")]
    pub amount: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub block_number: i64,
    /// Unix milliseconds.
    #[prost(int64, tag = "4")]
    pub decay_start_timestamp: i64,
    /// Unix milliseconds.
    #[prost(int64, tag = "5")]
    pub decay_end_timestamp: i64,
    #[prost(string, repeated, tag = "6")]
    pub reverting_tx_hashes: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// Hex EIP-2718 encoded signed transactions without the 0x prefix.
    #[prost(string, repeated, tag = "7")]
    pub raw_transactions: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
/// A provider's commitment to include the bid's transactions.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Commitment {
    #[prost(string, repeated, tag = "1")]
    pub tx_hashes: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, tag = "2")]
    pub bid_amount: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub block_number: i64,
    #[prost(string, tag = "4")]
    pub received_bid_digest: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub received_bid_signature: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub commitment_digest: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub commitment_signature: ::prost::alloc::string::String,
    #[prost(string, tag = "8")]
    pub provider_address: ::prost::alloc::string::String,
    #[prost(int64, tag = "9")]
    pub decay_start_timestamp: i64,
    #[prost(int64, tag = "10")]
    pub decay_end_timestamp: i64,
    #[prost(int64, tag = "11")]
    pub dispatch_timestamp: i64,
    #[prost(string, repeated, tag = "12")]
    pub reverting_tx_hashes: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
/// Generated client implementations.
pub mod bidder_client {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value,
    )]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    #[derive(Debug, Clone)]
    pub struct BidderClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl BidderClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> BidderClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        /// Sends a bid and streams back every commitment made for it.
        pub async fn send_bid(
            &mut self,
            request: impl tonic::IntoRequest<super::Bid>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::Commitment>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/bidderapi.v1.Bidder/SendBid",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("bidderapi.v1.Bidder", "SendBid"));
            self.inner.server_streaming(req, path, codec).await
        }
    }
}
