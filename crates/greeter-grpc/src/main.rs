//! Greeter gRPC Server
//!
//! Serves the `helloworld.Greeter` service, optionally alongside the health
//! and reflection services, on a fixed-size worker pool.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use greeter_grpc::{GreeterServer, HealthRegistry, ServerConfig};

/// Greeter gRPC Server - unary and streaming greeting demo
#[derive(Parser, Debug)]
#[command(name = "greeter-server")]
#[command(about = "gRPC server demonstrating every call shape")]
struct Args {
    /// JSON config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on [default: [::]:50051]
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Number of worker threads [default: 10]
    #[arg(long)]
    workers: Option<usize>,

    /// Log every call before and after it runs
    #[arg(long)]
    log_requests: bool,

    /// Do not register the health service
    #[arg(long)]
    no_health: bool,

    /// Do not register the reflection service
    #[arg(long)]
    no_reflection: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServerConfig::default(),
        };
        if let Some(addr) = self.addr {
            config.addr = addr;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.log_requests {
            config.log_requests = true;
        }
        if self.no_health {
            config.health = false;
        }
        if self.no_reflection {
            config.reflection = false;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = Args::parse().into_config()?;
    tracing::debug!(?config, "Loaded configuration");

    let server = GreeterServer::new(config, HealthRegistry::new());
    let runtime = server.runtime().context("building runtime")?;
    runtime.block_on(server.run())?;

    Ok(())
}
