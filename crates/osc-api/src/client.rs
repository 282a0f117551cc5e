//! Repository client.
//!
//! [`OscApi`] performs one HTTP round trip per resource, decodes the body and
//! commits the result into its [`Catalog`]. A failed fetch leaves the catalog
//! untouched and reports which resource failed and why. Nothing is retried.

use std::{collections::HashMap, fmt, sync::Arc};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, Snapshot},
    category::RepositoryInformation,
    config::ClientConfig,
    error::{ApiError, FetchError, Result},
    http_client::{Transport, UreqTransport},
    Category, Package,
};

/// Remote resources served by the repository API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Information,
    Contents,
    FeaturedApp,
}

impl Resource {
    /// Endpoint path below `/api/v{version}/`.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Information => "information",
            Self::Contents => "contents",
            Self::FeaturedApp => "featured-app",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Information => "repository information",
            Self::Contents => "package contents",
            Self::FeaturedApp => "featured app",
        };
        f.write_str(name)
    }
}

/// Builder for [`OscApi`].
///
/// # Example
///
/// ```no_run
/// use osc_api::OscApi;
///
/// fn newest_game() -> osc_api::Result<Option<String>> {
///     let api = OscApi::builder("MyHomebrewTool/1.0").build()?;
///     api.fetch_repository_information()?;
///     api.fetch_packages()?;
///     Ok(api.newest_slugs().remove("games"))
/// }
/// ```
pub struct OscApiBuilder {
    config: ClientConfig,
    transport: Option<Box<dyn Transport>>,
}

impl OscApiBuilder {
    pub fn new<S: Into<String>>(user_agent: S) -> Self {
        Self::from_config(ClientConfig::default().with_user_agent(user_agent))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn api_version(mut self, api_version: u32) -> Self {
        self.config.api_version = api_version;
        self
    }

    /// Uses `transport` instead of a [`UreqTransport`] built from the config.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn build(self) -> Result<OscApi> {
        let user_agent = self.config.user_agent_header()?;
        self.config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(UreqTransport::new(&self.config)?),
        };

        Ok(OscApi {
            config: self.config,
            user_agent,
            transport,
            catalog: Catalog::new(),
        })
    }
}

/// Client for the Open Shop Channel repository API.
///
/// Starts with an empty catalog. Each `fetch_*` call replaces one part of it;
/// queries operate on whatever has been fetched so far. The client can be
/// shared between threads. Concurrent fetches of the same resource race and
/// the last one to finish wins.
pub struct OscApi {
    config: ClientConfig,
    user_agent: String,
    transport: Box<dyn Transport>,
    catalog: Catalog,
}

impl fmt::Debug for OscApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OscApi")
            .field("config", &self.config)
            .field("user_agent", &self.user_agent)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl OscApi {
    /// Creates a client for the default host.
    ///
    /// `user_agent` should identify the calling application; it is trimmed and
    /// must not be blank.
    pub fn new<S: Into<String>>(user_agent: S) -> Result<Self> {
        OscApiBuilder::new(user_agent).build()
    }

    pub fn builder<S: Into<String>>(user_agent: S) -> OscApiBuilder {
        OscApiBuilder::new(user_agent)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full `User-Agent` value sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.catalog.snapshot()
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.catalog.list_categories()
    }

    pub fn list_packages(&self) -> Vec<Package> {
        self.catalog.list_packages()
    }

    pub fn filter_packages(&self, category: Option<&str>, name: Option<&str>) -> Vec<Package> {
        self.catalog.filter_packages(category, name)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<Package> {
        self.catalog.get_by_slug(slug)
    }

    /// See [`Snapshot::featured_app`].
    pub fn get_featured_app(&self) -> Result<Option<Package>> {
        self.catalog.get_featured_app()
    }

    pub fn newest_slugs(&self) -> HashMap<String, String> {
        self.catalog.newest_slugs()
    }

    pub fn newest_packages(&self) -> HashMap<String, Package> {
        self.catalog.newest_packages()
    }

    /// Fetches the category list and replaces the cached one.
    pub fn fetch_repository_information(&self) -> Result<()> {
        let info: RepositoryInformation = self.request(Resource::Information)?;
        debug!("Fetched {} categories", info.available_categories.len());
        self.catalog.replace_categories(info.available_categories);
        Ok(())
    }

    /// Fetches all packages, replaces the cached list and recomputes the
    /// newest-package index.
    pub fn fetch_packages(&self) -> Result<()> {
        let packages: Vec<Package> = self.request(Resource::Contents)?;
        debug!("Fetched {} packages", packages.len());
        self.catalog.replace_packages(packages);
        Ok(())
    }

    /// Fetches the featured app and records its slug. The package itself is
    /// resolved later against the cached package list.
    pub fn fetch_featured_app(&self) -> Result<()> {
        let featured: Package = self.request(Resource::FeaturedApp)?;
        debug!("Featured app is {}", featured.slug);
        self.catalog.set_featured_slug(featured.slug);
        Ok(())
    }

    /// Fetches categories, packages and the featured app in that order,
    /// stopping at the first failure.
    pub fn fetch_all(&self) -> Result<()> {
        self.fetch_repository_information()?;
        self.fetch_packages()?;
        self.fetch_featured_app()
    }

    fn request<T: DeserializeOwned>(&self, resource: Resource) -> Result<T> {
        let url = self.config.endpoint(resource.path());
        self.fetch_json(&url).map_err(|source| {
            warn!("Failed to fetch {}: {}", resource, source);
            ApiError::Fetch {
                resource,
                source,
            }
        })
    }

    fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> std::result::Result<T, FetchError> {
        let body = self.transport.get(url, &self.user_agent)?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchError::EmptyResponseBody {
                url: url.to_string(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| {
            FetchError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }
}
