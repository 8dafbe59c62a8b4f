//! Greeter client
//!
//! Issues one call of each shape against a greeter server and prints the
//! replies to stdout. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use greeter_client::{DEFAULT_ADDR, Driver};

/// Greeter client - exercises every call shape of the greeter service
#[derive(Parser, Debug)]
#[command(name = "greeter-client")]
#[command(about = "gRPC client demonstrating every call shape")]
struct Args {
    /// Server address to connect to
    #[arg(long, default_value = DEFAULT_ADDR)]
    addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - output to stderr so it doesn't mix with the demo output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let args = Args::parse();

    let mut driver = Driver::connect(&args.addr, std::io::stdout())
        .await
        .with_context(|| format!("connecting to {}", args.addr))?;
    let failures = driver.run().await.context("writing output")?;

    if failures > 0 {
        tracing::warn!("{} call(s) failed", failures);
    }
    Ok(())
}
