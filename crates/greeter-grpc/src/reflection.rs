//! Server reflection, in both the v1 and the older v1alpha protocol.

use tonic_reflection::pb::{v1, v1alpha};
use tonic_reflection::server::Builder;

use crate::GREETER_SERVICE_NAME;
use crate::config::ServerConfig;
use crate::error::ServerError;

/// Name of the reflection service itself (v1 protocol).
pub const REFLECTION_SERVICE_NAME: &str = "grpc.reflection.v1.ServerReflection";

/// Name of the reflection service itself (v1alpha protocol).
pub const REFLECTION_V1ALPHA_SERVICE_NAME: &str = "grpc.reflection.v1alpha.ServerReflection";

const HEALTH_SERVICE_NAME: &str = "grpc.health.v1.Health";

/// Fully-qualified names of the services advertised through reflection.
pub fn advertised_services(config: &ServerConfig) -> Vec<&'static str> {
    let mut names = vec![GREETER_SERVICE_NAME];
    if config.health {
        names.push(HEALTH_SERVICE_NAME);
    }
    names.push(REFLECTION_SERVICE_NAME);
    names.push(REFLECTION_V1ALPHA_SERVICE_NAME);
    names
}

fn builder(config: &ServerConfig) -> Builder<'static> {
    let mut builder = Builder::configure()
        .register_encoded_file_descriptor_set(crate::proto::FILE_DESCRIPTOR_SET);
    if config.health {
        builder =
            builder.register_encoded_file_descriptor_set(tonic_health::pb::FILE_DESCRIPTOR_SET);
    }
    for name in advertised_services(config) {
        builder = builder.with_service_name(name);
    }
    builder
}

/// Build the v1 reflection service for `config`.
pub(crate) fn service_v1(
    config: &ServerConfig,
) -> Result<
    v1::server_reflection_server::ServerReflectionServer<
        impl v1::server_reflection_server::ServerReflection + use<>,
    >,
    ServerError,
> {
    Ok(builder(config).build_v1()?)
}

/// Build the v1alpha reflection service for `config`.
pub(crate) fn service_v1alpha(
    config: &ServerConfig,
) -> Result<
    v1alpha::server_reflection_server::ServerReflectionServer<
        impl v1alpha::server_reflection_server::ServerReflection + use<>,
    >,
    ServerError,
> {
    Ok(builder(config).build_v1alpha()?)
}
