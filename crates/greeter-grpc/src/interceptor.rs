//! Logging interceptor.
//!
//! Wraps any [`Greeter`] implementation and records one event before and one
//! after every call. Requests and replies pass through untouched.
//!
//! For the server-streaming and bidirectional calls the "after" event is
//! emitted by [`LoggedStream`] once the reply stream ends, fails or is
//! dropped by the transport, not when the handler returns the stream.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Instant;

use tokio_stream::Stream;
use tonic::{Request, Response, Status, Streaming};

use crate::proto::greeter_server::Greeter;
use crate::proto::{HelloReply, HelloRequest};

/// A [`Greeter`] that logs around an inner one.
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor<S> {
    inner: S,
}

impl<S> LoggingInterceptor<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

async fn observe<T, F>(method: &'static str, call: F) -> Result<Response<T>, Status>
where
    F: Future<Output = Result<Response<T>, Status>>,
{
    tracing::info!(method, "Call started");
    let started = Instant::now();
    let result = call.await;
    match &result {
        Ok(_) => tracing::info!(method, elapsed = ?started.elapsed(), "Call finished"),
        Err(status) => tracing::warn!(
            method,
            elapsed = ?started.elapsed(),
            code = ?status.code(),
            "Call failed"
        ),
    }
    result
}

async fn observe_stream<T, F>(
    method: &'static str,
    call: F,
) -> Result<Response<LoggedStream<T>>, Status>
where
    F: Future<Output = Result<Response<T>, Status>>,
{
    tracing::info!(method, "Call started");
    let started = Instant::now();
    match call.await {
        Ok(response) => Ok(response.map(|stream| LoggedStream::new(method, started, stream))),
        Err(status) => {
            tracing::warn!(
                method,
                elapsed = ?started.elapsed(),
                code = ?status.code(),
                "Call failed"
            );
            Err(status)
        }
    }
}

/// Reply stream of a logged call. Records the end of the call when the
/// inner stream is exhausted, yields an error, or is dropped early.
#[derive(Debug)]
pub struct LoggedStream<T> {
    inner: Pin<Box<T>>,
    method: &'static str,
    started: Instant,
    replies: usize,
    finished: bool,
}

impl<T> LoggedStream<T> {
    fn new(method: &'static str, started: Instant, inner: T) -> Self {
        Self {
            inner: Box::pin(inner),
            method,
            started,
            replies: 0,
            finished: false,
        }
    }

    /// Number of replies yielded so far.
    pub fn replies(&self) -> usize {
        self.replies
    }
}

impl<T, R> Stream for LoggedStream<T>
where
    T: Stream<Item = Result<R, Status>>,
{
    type Item = Result<R, Status>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = ready!(this.inner.as_mut().poll_next(cx));
        match &item {
            Some(Ok(_)) => this.replies += 1,
            Some(Err(status)) if !this.finished => {
                this.finished = true;
                tracing::warn!(
                    method = this.method,
                    replies = this.replies,
                    elapsed = ?this.started.elapsed(),
                    code = ?status.code(),
                    "Call failed"
                );
            }
            Some(Err(_)) => {}
            None if !this.finished => {
                this.finished = true;
                tracing::info!(
                    method = this.method,
                    replies = this.replies,
                    elapsed = ?this.started.elapsed(),
                    "Call finished"
                );
            }
            None => {}
        }
        Poll::Ready(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> Drop for LoggedStream<T> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!(
                method = self.method,
                replies = self.replies,
                elapsed = ?self.started.elapsed(),
                "Call cancelled"
            );
        }
    }
}

#[tonic::async_trait]
impl<S: Greeter> Greeter for LoggingInterceptor<S> {
    async fn say_hello(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<HelloReply>, Status> {
        observe("SayHello", self.inner.say_hello(request)).await
    }

    async fn say_hello_again(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<HelloReply>, Status> {
        observe("SayHelloAgain", self.inner.say_hello_again(request)).await
    }

    type SayHelloStreamStream = LoggedStream<S::SayHelloStreamStream>;

    async fn say_hello_stream(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<Self::SayHelloStreamStream>, Status> {
        observe_stream("SayHelloStream", self.inner.say_hello_stream(request)).await
    }

    async fn say_hello_client_stream(
        &self,
        request: Request<Streaming<HelloRequest>>,
    ) -> Result<Response<HelloReply>, Status> {
        observe(
            "SayHelloClientStream",
            self.inner.say_hello_client_stream(request),
        )
        .await
    }

    type SayHelloBiStreamStream = LoggedStream<S::SayHelloBiStreamStream>;

    async fn say_hello_bi_stream(
        &self,
        request: Request<Streaming<HelloRequest>>,
    ) -> Result<Response<Self::SayHelloBiStreamStream>, Status> {
        observe_stream("SayHelloBiStream", self.inner.say_hello_bi_stream(request)).await
    }
}
