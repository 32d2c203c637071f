//! `hz-http-client` is a resilient async client for calling JSON HTTP APIs
//! owned by other services.
//!
//! - [`HttpClient::get`], [`HttpClient::post`] and [`HttpClient::patch`]
//!   (plus `*_with_headers` forms) send JSON and decode JSON.
//! - Statuses above 499 are retried with a linear [`BackoffPolicy`].
//! - Error payloads ([`ErrorResponse`]) are mapped to registered
//!   [`ServiceError`] values so callers can branch on them.

mod backoff;
mod client;
mod config;
mod error;
mod mapping;
mod service_error;
mod wire;

pub use backoff::BackoffPolicy;
pub use client::{ErrorLogger, HttpClient};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ErrorKind};
pub use mapping::ErrorMapping;
pub use service_error::ServiceError;
pub use wire::ErrorResponse;

pub type Result<T> = std::result::Result<T, ClientError>;
