//! Error types for the API client.
//!
//! [`FetchError`] describes why a single HTTP round trip failed, while
//! [`ApiError`] is the error surfaced to callers. A failed fetch is always
//! wrapped as [`ApiError::Fetch`] together with the [`Resource`] it was for.

use miette::Diagnostic;
use thiserror::Error;

use crate::client::Resource;

/// Cause of a failed fetch.
#[derive(Error, Diagnostic, Debug)]
pub enum FetchError {
    #[error("{url} responded with HTTP status {status}")]
    #[diagnostic(
        code(osc_api::http_status),
        help("The repository may be unavailable or may not support this API version")
    )]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed")]
    #[diagnostic(
        code(osc_api::transport),
        help("Check your network connection and the repository host")
    )]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("{url} returned an empty response body")]
    #[diagnostic(code(osc_api::empty_body))]
    EmptyResponseBody { url: String },

    #[error("Failed to decode the response from {url}")]
    #[diagnostic(
        code(osc_api::decode),
        help("The repository returned data in an unexpected format")
    )]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Transport { url, .. }
            | Self::EmptyResponseBody { url }
            | Self::Decode { url, .. } => url,
        }
    }

    /// Whether the request itself failed, either at the transport level or
    /// with a non-success status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Transport { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    pub fn is_empty_body(&self) -> bool {
        matches!(self, Self::EmptyResponseBody { .. })
    }
}

/// Errors raised while loading client configuration.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(osc_api::config::toml),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Error while {action}")]
    #[diagnostic(code(osc_api::config::io))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid timeout: {0}")]
    #[diagnostic(
        code(osc_api::config::timeout),
        help("Use a duration such as `30s`, `2m` or `1m30s`")
    )]
    InvalidTimeout(String),

    #[error("Invalid proxy: {0}")]
    #[diagnostic(code(osc_api::config::proxy))]
    InvalidProxy(String),
}

/// Errors returned by the API client.
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to fetch {resource} from the repository")]
    #[diagnostic(code(osc_api::fetch))]
    Fetch {
        resource: Resource,
        #[source]
        source: FetchError,
    },

    #[error("Featured app `{slug}` is not present in the package list")]
    #[diagnostic(
        code(osc_api::featured_app_not_found),
        help("The package list may be stale; fetch the packages again")
    )]
    FeaturedAppNotFound { slug: String },

    #[error("Package `{slug}` not found")]
    #[diagnostic(
        code(osc_api::package_not_found),
        help("Check the slug against the current package list")
    )]
    PackageNotFound { slug: String },

    #[error("User agent cannot be empty")]
    #[diagnostic(
        code(osc_api::empty_user_agent),
        help("Use a user agent that identifies your application")
    )]
    EmptyUserAgent,

    #[error("Invalid URL: {0}")]
    #[diagnostic(
        code(osc_api::invalid_url),
        help("Ensure the host is an absolute http(s) URL")
    )]
    InvalidUrl(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// The fetch failure behind this error, if it is one.
    pub fn fetch_error(&self) -> Option<(Resource, &FetchError)> {
        match self {
            Self::Fetch { resource, source } => Some((*resource, source)),
            _ => None,
        }
    }
}

/// A specialized Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> std::result::Result<T, ConfigError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, ConfigError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            ConfigError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
