//! Serving-status table for the grpc.health.v1 service.
//!
//! A [`HealthRegistry`] is created together with the health service that
//! answers from it. Both halves are handed to the server at construction, so
//! tests can keep the registry and flip statuses without any process-wide
//! state.

use tonic_health::ServingStatus;
use tonic_health::pb::health_server::{Health, HealthServer};
use tonic_health::server::HealthReporter;

/// Settable serving status keyed by fully-qualified service name.
///
/// Clones share the same table.
#[derive(Clone, Debug)]
pub struct HealthRegistry {
    reporter: HealthReporter,
}

impl HealthRegistry {
    /// Create a registry and the gRPC health service answering from it.
    ///
    /// Only the overall server (`""`) is known, and it is serving.
    pub fn new() -> (Self, HealthServer<impl Health>) {
        let (reporter, service) = tonic_health::server::health_reporter();
        (Self { reporter }, service)
    }

    /// Mark `service` as serving.
    pub async fn mark_serving(&mut self, service: &str) {
        self.set_status(service, ServingStatus::Serving).await;
    }

    /// Mark `service` as not serving.
    pub async fn mark_not_serving(&mut self, service: &str) {
        self.set_status(service, ServingStatus::NotServing).await;
    }

    async fn set_status(&mut self, service: &str, status: ServingStatus) {
        tracing::debug!(service, ?status, "Updating health status");
        self.reporter.set_service_status(service, status).await;
    }
}
