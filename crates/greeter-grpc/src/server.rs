//! Server configuration and runner.

use std::future::Future;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::transport::server::Router;
use tonic_health::pb::health_server::{Health, HealthServer};

use crate::GREETER_SERVICE_NAME;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::health::HealthRegistry;
use crate::interceptor::LoggingInterceptor;
use crate::proto::greeter_server::GreeterServer as GreeterGrpcServer;
use crate::reflection;
use crate::service::GreeterService;

/// Server configuration and runner.
///
/// `H` is the health service paired with the server's [`HealthRegistry`].
pub struct GreeterServer<H> {
    config: ServerConfig,
    health: HealthRegistry,
    health_service: HealthServer<H>,
}

impl<H> std::fmt::Debug for GreeterServer<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreeterServer")
            .field("config", &self.config)
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

impl<H: Health> GreeterServer<H> {
    /// Create a new server answering health checks from `health`, a pair as
    /// returned by [`HealthRegistry::new`].
    pub fn new(config: ServerConfig, health: (HealthRegistry, HealthServer<H>)) -> Self {
        let (health, health_service) = health;
        Self {
            config,
            health,
            health_service,
        }
    }

    /// The configuration this server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build a multi-threaded runtime sized by `workers`.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, ServerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers.max(1))
            .thread_name("greeter-worker")
            .enable_all()
            .build()?;
        Ok(runtime)
    }

    async fn router(mut self) -> Result<Router, ServerError> {
        let greeter = GreeterService::new();
        let (plain, logged) = if self.config.log_requests {
            tracing::info!("Request logging enabled");
            (None, Some(GreeterGrpcServer::new(LoggingInterceptor::new(greeter))))
        } else {
            (Some(GreeterGrpcServer::new(greeter)), None)
        };

        let health = if self.config.health {
            self.health.mark_serving(GREETER_SERVICE_NAME).await;
            Some(self.health_service)
        } else {
            None
        };

        let (reflection_v1, reflection_v1alpha) = if self.config.reflection {
            (
                Some(reflection::service_v1(&self.config)?),
                Some(reflection::service_v1alpha(&self.config)?),
            )
        } else {
            (None, None)
        };

        Ok(Server::builder()
            .add_optional_service(plain)
            .add_optional_service(logged)
            .add_optional_service(health)
            .add_optional_service(reflection_v1)
            .add_optional_service(reflection_v1alpha))
    }

    /// Run the server on the configured address until shutdown signal.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr;
        let router = self.router().await?;

        tracing::info!("Starting gRPC server on {}", addr);

        router.serve_with_shutdown(addr, shutdown_signal()).await?;

        tracing::info!("gRPC server shut down");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_with_listener<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let router = self.router().await?;

        tracing::info!("Starting gRPC server on {}", listener.local_addr()?);

        router
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await?;

        tracing::info!("gRPC server shut down");
        Ok(())
    }
}

/// Completes on the first of Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "Ctrl+C",
        () = terminate => "SIGTERM",
    };
    tracing::info!("Received {}, stopping greeter server", signal);
}
