//! Client configuration.
//!
//! [`ClientConfig`] selects the repository host and API version, carries the
//! caller's user agent, and tunes the default HTTP transport. It can be built
//! in code or loaded from a TOML file where every field is optional.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, ConfigError, ErrorContext};

/// Well-known host of the Open Shop Channel repository.
pub const DEFAULT_HOST: &str = "https://hbb1.oscwii.org";

/// Repository API version spoken by this client.
pub const API_VERSION: u32 = 4;

/// Product identification appended to every caller-supplied user agent.
pub const USER_AGENT_SUFFIX: &str = "Open Shop Channel API Rust Client (v4)";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the repository.
    /// Default: https://hbb1.oscwii.org
    pub host: String,

    /// API version used to build endpoint URLs.
    /// Default: 4
    pub api_version: u32,

    /// String identifying the calling application.
    pub user_agent: Option<String>,

    /// Global request timeout, e.g. `30s` or `1m30s`.
    pub timeout: Option<String>,

    /// Proxy URL for all requests.
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_version: API_VERSION,
            user_agent: None,
            timeout: None,
            proxy: None,
        }
    }
}

impl ClientConfig {
    /// Parses a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a configuration file, falling back to the defaults when the file
    /// does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout<S: Into<String>>(mut self, timeout: S) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    pub fn with_proxy<S: Into<String>>(mut self, proxy: S) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Checks that the host is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = Url::parse(&self.host)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.host)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => {
                Err(ApiError::InvalidUrl(format!(
                    "{}: unsupported scheme `{scheme}`",
                    self.host
                )))
            }
        }
    }

    /// Builds the full URL of an API endpoint.
    ///
    /// # Example
    ///
    /// ```
    /// use osc_api::ClientConfig;
    ///
    /// let config = ClientConfig::default().with_host("https://example.com/");
    /// assert_eq!(config.endpoint("contents"), "https://example.com/api/v4/contents");
    /// ```
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/v{}/{}",
            self.host.trim_end_matches('/'),
            self.api_version,
            path
        )
    }

    /// Builds the `User-Agent` header value sent with every request.
    ///
    /// The caller's string is trimmed and must not be blank.
    pub fn user_agent_header(&self) -> Result<String, ApiError> {
        let user_agent = self
            .user_agent
            .as_deref()
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
            .ok_or(ApiError::EmptyUserAgent)?;
        Ok(format!("{user_agent} - {USER_AGENT_SUFFIX}"))
    }

    /// Parses the configured timeout.
    pub fn timeout_duration(&self) -> Result<Option<Duration>, ConfigError> {
        self.timeout
            .as_deref()
            .map(|timeout| {
                parse_duration(timeout).ok_or_else(|| ConfigError::InvalidTimeout(timeout.into()))
            })
            .transpose()
    }
}

/// Parses a duration string such as `1h30m` or `45s`.
///
/// The string is a sequence of integers, each followed by one of the units
/// `s`, `m`, `h` or `d`. Returns `None` for malformed input or on overflow.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use osc_api::config::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("30"), None);
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let mut total: u64 = 0;
    let mut chars = input.trim().chars().peekable();

    if chars.peek().is_none() {
        return None;
    }

    while chars.peek().is_some() {
        let mut number_str = String::new();
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() {
                number_str.push(chars.next()?);
            } else {
                break;
            }
        }

        if number_str.is_empty() {
            return None;
        }

        let number: u64 = number_str.parse().ok()?;
        let multiplier = match chars.next()? {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return None,
        };

        total = total.checked_add(number.checked_mul(multiplier)?)?;
    }

    Some(Duration::from_secs(total))
}
