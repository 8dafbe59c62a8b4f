//! Greeter client
//!
//! Walks through every call shape of the `helloworld.Greeter` service:
//! a health check, unary calls with metadata, the structured error path,
//! server streaming, client streaming and bidirectional streaming. Output
//! goes to any [`std::io::Write`] so the walk can be captured.

mod driver;
mod render;

pub use driver::{CallError, ConnectError, DEFAULT_ADDR, Driver, FAKE_TOKEN};
pub use render::{
    UNEXPECTED_ERROR, banner, render_bad_request, render_reply, render_status_details, separator,
};
