//! Error types.

use tonic::{Code, Status};
use tonic_types::{ErrorDetails, StatusExt};

/// Application errors raised by the greeting rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GreeterError {
    /// The request carried a reserved name.
    #[error("name '{name}' is invalid.")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
}

impl GreeterError {
    /// The request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "name",
        }
    }
}

impl From<GreeterError> for Status {
    fn from(err: GreeterError) -> Self {
        let details = ErrorDetails::with_bad_request_violation(err.field(), err.to_string());
        match err {
            GreeterError::InvalidName { .. } => Status::with_error_details(
                Code::InvalidArgument,
                "request contains invalid arguments",
                details,
            ),
        }
    }
}

/// Errors that stop the server from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The tonic transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// A file descriptor set could not be loaded into the reflection service.
    #[error("reflection setup failed: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),

    /// Binding or building the runtime failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
