//! Greeting rules shared by every call shape.
//!
//! Everything here is pure: no transport types, no I/O. The gRPC service
//! routes each call to one of these functions.

use crate::error::GreeterError;
use crate::proto::{HelloReply, HelloRequest};

/// The one name `SayHello` refuses.
pub const ANONYMOUS_NAME: &str = "anonymous";

/// The one name that earns a welcome.
pub const WELCOME_NAME: &str = "hyemi";

/// Texts produced by the server-streaming call, in order.
pub const STREAM_MESSAGES: [&str; 4] = ["one", "two", "three", "four"];

/// Returns true if `name` should be welcomed.
pub fn is_welcome(name: &str) -> bool {
    name == WELCOME_NAME
}

/// Unary greeting.
///
/// Fails with [`GreeterError::InvalidName`] for [`ANONYMOUS_NAME`]; every
/// other name succeeds.
pub fn greet(request: &HelloRequest) -> Result<HelloReply, GreeterError> {
    if request.name == ANONYMOUS_NAME {
        return Err(GreeterError::InvalidName {
            name: request.name.clone(),
        });
    }
    Ok(hello(&request.name))
}

/// Second unary greeting. Never welcomes.
pub fn greet_again(request: &HelloRequest) -> HelloReply {
    HelloReply {
        message: format!("Hello again, {}!", request.name),
        is_welcome: false,
    }
}

/// Client-streaming greeting over every collected name.
pub fn greet_everyone<I, S>(names: I) -> HelloReply
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = names
        .into_iter()
        .map(|name| name.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(", ");
    HelloReply {
        message: format!("Hello everyone!, {joined}"),
        is_welcome: true,
    }
}

/// Reply for one message of the bidirectional stream.
///
/// Applies the unary welcome rule without the anonymous guard.
pub fn echo(request: &HelloRequest) -> HelloReply {
    hello(&request.name)
}

fn hello(name: &str) -> HelloReply {
    HelloReply {
        message: format!("Hello, {name}!"),
        is_welcome: is_welcome(name),
    }
}

/// Pull-based producer for the server-streaming call.
///
/// Yields the four [`STREAM_MESSAGES`] once, each sharing the welcome flag
/// computed from the originating request. Exhausted producers stay
/// exhausted.
#[derive(Debug, Clone)]
pub struct CountdownReplies {
    is_welcome: bool,
    next: usize,
}

impl CountdownReplies {
    /// Create a producer for `request`.
    pub fn new(request: &HelloRequest) -> Self {
        Self {
            is_welcome: is_welcome(&request.name),
            next: 0,
        }
    }
}

impl Iterator for CountdownReplies {
    type Item = HelloReply;

    fn next(&mut self) -> Option<Self::Item> {
        let message = STREAM_MESSAGES.get(self.next)?;
        self.next += 1;
        Some(HelloReply {
            message: (*message).to_string(),
            is_welcome: self.is_welcome,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = STREAM_MESSAGES.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CountdownReplies {}

impl std::iter::FusedIterator for CountdownReplies {}
