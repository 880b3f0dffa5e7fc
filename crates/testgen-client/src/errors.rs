/// Errors surfaced by the client before or while talking to the generation
/// service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Service answered with a non-success status.
    #[error("request to {endpoint} failed: {message}")]
    Http {
        endpoint: String,
        message: String,
        status_code: Option<u16>,
    },
    /// Network or stream I/O failed.
    #[error("transport error ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },
    /// Response body did not have the expected shape.
    #[error("protocol error ({endpoint}): {message}")]
    Protocol { endpoint: String, message: String },
    /// Generated artifact could not be written.
    #[error("failed to save artifact to {path}: {message}")]
    Artifact { path: String, message: String },
}

impl ClientError {
    /// Creates an error for a non-success HTTP response.
    pub fn http(
        endpoint: impl Into<String>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Http {
            endpoint: endpoint.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code when the service produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Config(message) => message,
            Self::Http { message, .. }
            | Self::Transport { message, .. }
            | Self::Protocol { message, .. }
            | Self::Artifact { message, .. } => message,
        }
    }
}
