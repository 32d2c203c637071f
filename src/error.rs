use crate::{ConfigError, ServiceError};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The client configuration failed validation.
    #[error("generic http client error: invalid config: {0}")]
    Config(#[from] ConfigError),
    /// The underlying `reqwest` client could not be constructed.
    #[error("generic http client error: failed to build client: {0}")]
    Build(#[source] reqwest::Error),
    /// Network or request execution error from `reqwest`. Never retried.
    #[error("generic http client error: transport: {0}")]
    Transport(#[source] reqwest::Error),
    /// The request body could not be serialized to JSON.
    #[error("generic http client error: encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    /// A response body was not the expected JSON shape.
    #[error("generic http client error: decode: {0}")]
    Decode(String),
    /// A caller-supplied header name or value is not valid HTTP.
    #[error("generic http client error: invalid header '{0}'")]
    InvalidHeader(String),
    /// Upstream answered with an error code registered in the client's mapping.
    #[error("{error}: {message}")]
    Service {
        #[source]
        error: ServiceError,
        /// Message text from the upstream payload.
        message: String,
    },
    /// Upstream answered with an error code nobody registered.
    #[error("generic http client error: [{code}] - {message}")]
    Unmapped {
        /// HTTP status of the response.
        status: u16,
        code: String,
        message: String,
    },
    /// Every attempt ended with a server-range status.
    #[error("maximum retry attempts exceeded")]
    RetriesExhausted {
        /// Total attempts made, including the first one.
        attempts: usize,
        /// Status of the final response.
        last_status: u16,
    },
}

/// Coarse category of a [`ClientError`], for callers that only need to branch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Generic client error: transport, (de)serialization, invalid input or
    /// an unrecognized upstream code.
    Client,
    /// A registered [`ServiceError`] raised by upstream.
    Service,
    /// Server-range failures on every attempt.
    RetriesExhausted,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Service { .. } => ErrorKind::Service,
            Self::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            Self::Config(_)
            | Self::Build(_)
            | Self::Transport(_)
            | Self::Encode(_)
            | Self::Decode(_)
            | Self::InvalidHeader(_)
            | Self::Unmapped { .. } => ErrorKind::Client,
        }
    }

    /// The registered domain error, if upstream raised one.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns `true` when this error carries `expected` as its domain error.
    pub fn is(&self, expected: &ServiceError) -> bool {
        self.service_error() == Some(expected)
    }

    /// Upstream message text for `Service` and `Unmapped` errors.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Service { message, .. } | Self::Unmapped { message, .. } => Some(message),
            _ => None,
        }
    }
}
