//! gRPC service implementation for the Greeter service.

use std::pin::Pin;

use tokio_stream::{Stream, StreamExt};
use tonic::metadata::MetadataValue;
use tonic::{Request, Response, Status, Streaming};

use crate::greeting::{self, CountdownReplies};
use crate::proto::{self, HelloReply, HelloRequest};

/// Request metadata key read by `SayHello`.
pub const ACCESS_TOKEN_KEY: &str = "access-token";

/// Response metadata key set by `SayHello`.
pub const RETRY_KEY: &str = "retry";

/// The Greeter gRPC service implementation.
///
/// Stateless: every call is answered from its own request alone.
#[derive(Clone, Debug, Default)]
pub struct GreeterService {}

impl GreeterService {
    /// Create a new greeter service.
    pub fn new() -> Self {
        Self {}
    }
}

type ReplyStream = Pin<Box<dyn Stream<Item = Result<HelloReply, Status>> + Send>>;

#[tonic::async_trait]
impl proto::greeter_server::Greeter for GreeterService {
    async fn say_hello(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<HelloReply>, Status> {
        let access_token = request
            .metadata()
            .get(ACCESS_TOKEN_KEY)
            .and_then(|value| value.to_str().ok());
        tracing::debug!(
            name = %request.get_ref().name,
            has_access_token = access_token.is_some(),
            "SayHello"
        );

        let reply = greeting::greet(request.get_ref())?;

        let mut response = Response::new(reply);
        response
            .metadata_mut()
            .insert(RETRY_KEY, MetadataValue::from_static("false"));
        Ok(response)
    }

    async fn say_hello_again(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<HelloReply>, Status> {
        Ok(Response::new(greeting::greet_again(request.get_ref())))
    }

    type SayHelloStreamStream = ReplyStream;

    async fn say_hello_stream(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<Self::SayHelloStreamStream>, Status> {
        // Pulled one element at a time; tonic drops the stream when the
        // client goes away, which ends production.
        let replies = CountdownReplies::new(request.get_ref());
        let stream = tokio_stream::iter(replies.map(Ok));
        Ok(Response::new(Box::pin(stream) as ReplyStream))
    }

    async fn say_hello_client_stream(
        &self,
        request: Request<Streaming<HelloRequest>>,
    ) -> Result<Response<HelloReply>, Status> {
        let mut inbound = request.into_inner();

        let mut names = Vec::new();
        while let Some(req) = inbound.message().await? {
            names.push(req.name);
        }
        tracing::debug!(count = names.len(), "Client stream finished");

        Ok(Response::new(greeting::greet_everyone(names)))
    }

    type SayHelloBiStreamStream = ReplyStream;

    async fn say_hello_bi_stream(
        &self,
        request: Request<Streaming<HelloRequest>>,
    ) -> Result<Response<Self::SayHelloBiStreamStream>, Status> {
        let inbound = request.into_inner();
        let outbound = inbound.map(|item| item.map(|req| greeting::echo(&req)));
        Ok(Response::new(Box::pin(outbound) as ReplyStream))
    }
}
