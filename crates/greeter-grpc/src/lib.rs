//! Greeter gRPC Server
//!
//! A small gRPC service that demonstrates every call shape tonic supports:
//! unary, server streaming, client streaming and bidirectional streaming,
//! together with metadata exchange, structured error details, health
//! checking, server reflection and a logging interceptor.
//!
//! # Call shapes
//!
//! ```text
//! Client                                          Server
//! │                                                 │
//! │  SayHello{name: "damian"}  [access-token]       │
//! │ ───────────────────────────────────────────────>│
//! │       HelloReply{"Hello, damian!"}  [retry]     │
//! │<─────────────────────────────────────────────── │
//! │                                                 │
//! │  SayHelloStream{name: "hyemi"}                  │
//! │ ───────────────────────────────────────────────>│
//! │       one, two, three, four                     │
//! │<─────────────────────────────────────────────── │
//! │                                                 │
//! │  SayHelloClientStream{jam}, {ham}, {tam}        │
//! │ ───────────────────────────────────────────────>│
//! │       "Hello everyone!, jam, ham, tam"          │
//! │<─────────────────────────────────────────────── │
//! │                                                 │
//! │  SayHelloBiStream{jam1} ... {jam3}              │
//! │ ───────────────────────────────────────────────>│
//! │       one reply per request                     │
//! │<─────────────────────────────────────────────── │
//! ```
//!
//! The service itself is stateless. The only shared state is the health
//! table, which is owned by a [`HealthRegistry`] handed to the server at
//! construction together with the health service answering from it.

pub mod proto {
    #![allow(missing_docs)]
    #![allow(clippy::doc_markdown)]
    tonic::include_proto!("helloworld");

    /// Encoded file descriptor set used by the reflection service.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("helloworld_descriptor");
}

mod config;
mod error;
mod greeting;
mod health;
mod interceptor;
mod reflection;
mod server;
mod service;

pub use config::{ConfigError, ServerConfig};
pub use error::{GreeterError, ServerError};
pub use greeting::{
    ANONYMOUS_NAME, CountdownReplies, STREAM_MESSAGES, WELCOME_NAME, echo, greet, greet_again,
    greet_everyone, is_welcome,
};
pub use health::HealthRegistry;
pub use interceptor::{LoggedStream, LoggingInterceptor};
pub use reflection::{
    REFLECTION_SERVICE_NAME, REFLECTION_V1ALPHA_SERVICE_NAME, advertised_services,
};
pub use server::GreeterServer;
pub use service::{ACCESS_TOKEN_KEY, GreeterService, RETRY_KEY};

// Re-export proto types for convenience
pub use proto::{
    Gender, HelloReply, HelloRequest, greeter_client::GreeterClient,
    greeter_server::GreeterServer as GreeterGrpcServer,
};

/// Fully-qualified name of the greeter service, as used by health checks
/// and reflection.
pub const GREETER_SERVICE_NAME: &str = "helloworld.Greeter";
