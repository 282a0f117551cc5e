//! HTTP transport.
//!
//! The client reaches the network only through the [`Transport`] trait so the
//! catalog logic can be driven by any HTTP stack. [`UreqTransport`] is the
//! default implementation.

use std::fmt;

use tracing::debug;
use ureq::{http::header::USER_AGENT, Agent, Proxy};

use crate::{
    config::ClientConfig,
    error::{ConfigError, FetchError},
};

/// Upper bound for a single response body.
pub const MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

/// Performs a blocking GET and returns the raw response body.
///
/// Implementations must report non-success statuses as
/// [`FetchError::Status`] and lower-level failures (including timeouts) as
/// [`FetchError::Transport`]. An empty body is returned as-is; the caller
/// decides what it means.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, user_agent: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`Transport`] backed by a [`ureq::Agent`].
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Builds an agent from the proxy and timeout settings of `config`.
    ///
    /// HTTP error statuses are not turned into transport errors by the agent,
    /// so they can be reported with their status code.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let proxy = config
            .proxy
            .as_deref()
            .map(Proxy::new)
            .transpose()
            .map_err(|err| ConfigError::InvalidProxy(err.to_string()))?;

        let agent = Agent::config_builder()
            .proxy(proxy)
            .timeout_global(config.timeout_duration()?)
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
        })
    }

    pub fn from_agent(agent: Agent) -> Self {
        Self {
            agent,
        }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, user_agent: &str) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching {}", url);

        let resp = self
            .agent
            .get(url)
            .header(USER_AGENT, user_agent)
            .call()
            .map_err(|source| {
                FetchError::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let mut body = resp.into_body();
        body.with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()
            .map_err(|source| {
                FetchError::Transport {
                    url: url.to_string(),
                    source,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_transport_from_default_config() {
        let transport = UreqTransport::new(&ClientConfig::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_transport_with_timeout() {
        let config = ClientConfig::default().with_timeout("30s");
        assert_eq!(
            config.timeout_duration().unwrap(),
            Some(Duration::from_secs(30))
        );
        assert!(UreqTransport::new(&config).is_ok());
    }

    #[test]
    fn test_transport_invalid_timeout() {
        let config = ClientConfig::default().with_timeout("thirty seconds");
        assert!(matches!(
            UreqTransport::new(&config),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_transport_with_proxy() {
        let config = ClientConfig::default().with_proxy("http://127.0.0.1:3128");
        assert!(UreqTransport::new(&config).is_ok());
    }

    #[test]
    fn test_transport_debug() {
        let transport = UreqTransport::from_agent(Agent::config_builder().build().into());
        assert!(format!("{transport:?}").contains("UreqTransport"));
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let config = ClientConfig::default().with_timeout("2s");
        let transport = UreqTransport::new(&config).unwrap();

        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let err = transport
            .get("http://127.0.0.1:9/api/v4/contents", "test - suffix")
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.url(), "http://127.0.0.1:9/api/v4/contents");
    }
}
