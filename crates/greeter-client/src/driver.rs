//! Sequential walk through every call shape of the greeter service.

use std::io::{self, Write};

use tonic::Request;
use tonic::metadata::{KeyAndValueRef, MetadataMap, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::{HealthCheckRequest, health_client::HealthClient};

use greeter_grpc::{ACCESS_TOKEN_KEY, GREETER_SERVICE_NAME, Gender, GreeterClient, HelloRequest};

use crate::render::{banner, render_reply, render_status_details, separator};

/// Default server address.
pub const DEFAULT_ADDR: &str = "http://localhost:50051";

/// Access token attached to the metadata demo call.
pub const FAKE_TOKEN: &str = "fake_token";

/// Why a single call of the walk failed.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The server or transport rejected the call.
    #[error("rpc failed: {0}")]
    Rpc(#[from] tonic::Status),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Why the driver could not reach the server.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The address is not a valid URI.
    #[error("invalid server address '{addr}': {source}")]
    InvalidAddress {
        /// The rejected address.
        addr: String,
        /// Underlying parse error.
        source: tonic::transport::Error,
    },

    /// The channel could not be established.
    #[error("failed to connect: {0}")]
    Transport(#[from] tonic::transport::Error),
}

fn person(name: &str, age: i32, gender: Gender) -> HelloRequest {
    HelloRequest {
        name: name.to_string(),
        age: Some(age),
        gender: Some(gender.into()),
    }
}

/// Issues one call per shape against a single channel and prints the
/// results to `out`.
#[derive(Debug)]
pub struct Driver<W> {
    channel: Channel,
    out: W,
}

impl<W: Write> Driver<W> {
    /// Create a driver over an existing channel.
    pub fn new(channel: Channel, out: W) -> Self {
        Self { channel, out }
    }

    /// Connect to `addr` and create a driver.
    pub async fn connect(addr: &str, out: W) -> Result<Self, ConnectError> {
        let endpoint =
            Endpoint::from_shared(addr.to_string()).map_err(|source| ConnectError::InvalidAddress {
                addr: addr.to_string(),
                source,
            })?;
        let channel = endpoint.connect().await?;
        tracing::debug!("Connected to {}", addr);
        Ok(Self::new(channel, out))
    }

    /// Consume the driver and return its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    fn greeter(&self) -> GreeterClient<Channel> {
        GreeterClient::new(self.channel.clone())
    }

    /// Run every step in order.
    ///
    /// A failed call is reported and the walk moves on; only output errors
    /// abort it. Returns the number of calls that failed.
    pub async fn run(&mut self) -> io::Result<usize> {
        let mut failures = 0;
        tally(self.health_check().await, &mut failures)?;
        tally(self.unary_with_metadata().await, &mut failures)?;
        tally(self.invalid_argument().await, &mut failures)?;
        tally(self.unary_again().await, &mut failures)?;
        tally(self.server_stream().await, &mut failures)?;
        tally(self.client_stream().await, &mut failures)?;
        tally(self.bidi_stream().await, &mut failures)?;
        Ok(failures)
    }

    /// Ask the health service whether the greeter is serving.
    pub async fn health_check(&mut self) -> Result<(), CallError> {
        let mut health = HealthClient::new(self.channel.clone());
        let response = health
            .check(HealthCheckRequest {
                service: GREETER_SERVICE_NAME.to_string(),
            })
            .await?
            .into_inner();

        let status = ServingStatus::try_from(response.status).unwrap_or(ServingStatus::Unknown);
        banner(&mut self.out, "Health Check")?;
        writeln!(self.out, "status: {}", status.as_str_name())?;
        Ok(())
    }

    /// Unary call carrying an access token; prints the response metadata.
    pub async fn unary_with_metadata(&mut self) -> Result<(), CallError> {
        let mut request = Request::new(person("damian", 32, Gender::Male));
        request
            .metadata_mut()
            .insert(ACCESS_TOKEN_KEY, MetadataValue::from_static(FAKE_TOKEN));

        let response = self.greeter().say_hello(request).await?;
        render_reply(&mut self.out, response.get_ref(), "Unary-Unary")?;
        separator(&mut self.out)?;
        writeln!(self.out, "metadata")?;
        render_metadata(&mut self.out, response.metadata())?;
        Ok(())
    }

    /// Unary call with the reserved name; decodes the structured error.
    pub async fn invalid_argument(&mut self) -> Result<(), CallError> {
        let request = HelloRequest {
            name: "anonymous".to_string(),
            ..Default::default()
        };
        match self.greeter().say_hello(request).await {
            Ok(response) => {
                tracing::warn!("Reserved name was accepted");
                render_reply(&mut self.out, response.get_ref(), "Unary-Unary")?;
            }
            Err(status) => {
                banner(&mut self.out, "rpc failed")?;
                render_status_details(&mut self.out, &status)?;
            }
        }
        Ok(())
    }

    /// Second unary call.
    pub async fn unary_again(&mut self) -> Result<(), CallError> {
        let response = self
            .greeter()
            .say_hello_again(person("damian", 32, Gender::Male))
            .await?;
        render_reply(&mut self.out, response.get_ref(), "Unary-Unary Again")?;
        Ok(())
    }

    /// Server-streaming call; prints every reply as it arrives.
    pub async fn server_stream(&mut self) -> Result<(), CallError> {
        let mut stream = self
            .greeter()
            .say_hello_stream(person("hyemi", 10, Gender::Female))
            .await?
            .into_inner();

        while let Some(reply) = stream.message().await? {
            render_reply(&mut self.out, &reply, "Unary-Streaming")?;
        }
        Ok(())
    }

    /// Client-streaming call over three requests.
    pub async fn client_stream(&mut self) -> Result<(), CallError> {
        let requests = vec![
            person("jam", 1, Gender::Female),
            person("ham", 2, Gender::Female),
            person("tam", 3, Gender::Male),
        ];
        let response = self
            .greeter()
            .say_hello_client_stream(tokio_stream::iter(requests))
            .await?;
        render_reply(&mut self.out, response.get_ref(), "Streaming-Unary")?;
        Ok(())
    }

    /// Bidirectional call over three requests; prints every reply.
    pub async fn bidi_stream(&mut self) -> Result<(), CallError> {
        let requests = vec![
            person("jam1", 1, Gender::Female),
            person("jam2", 2, Gender::Female),
            person("jam3", 3, Gender::Male),
        ];
        let mut stream = self
            .greeter()
            .say_hello_bi_stream(tokio_stream::iter(requests))
            .await?
            .into_inner();

        while let Some(reply) = stream.message().await? {
            render_reply(&mut self.out, &reply, "Streaming-Streaming")?;
        }
        Ok(())
    }
}

fn tally(result: Result<(), CallError>, failures: &mut usize) -> io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(CallError::Io(e)) => Err(e),
        Err(CallError::Rpc(status)) => {
            tracing::error!(code = ?status.code(), "Call failed: {}", status.message());
            *failures += 1;
            Ok(())
        }
    }
}

/// Print every ASCII metadata entry as `key value`.
fn render_metadata(out: &mut impl Write, metadata: &MetadataMap) -> io::Result<()> {
    for entry in metadata.iter() {
        if let KeyAndValueRef::Ascii(key, value) = entry {
            match value.to_str() {
                Ok(value) => writeln!(out, "{} {}", key.as_str(), value)?,
                Err(_) => writeln!(out, "{} <non-printable>", key.as_str())?,
            }
        }
    }
    Ok(())
}
