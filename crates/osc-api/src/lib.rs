//! Client library for the Open Shop Channel homebrew repository.
//!
//! This crate fetches the repository's category list, package catalog and
//! featured app over HTTP, caches them in memory and answers queries over the
//! cached snapshot.
//!
//! # Overview
//!
//! - [`OscApi`] performs the fetches and exposes the queries
//! - [`Catalog`] holds the cached state as an atomically swapped [`Snapshot`]
//! - [`NewestIndex`] maps each category, plus `"newest"` for the whole
//!   catalog, to its most recently released package
//! - [`Transport`] is the seam to the HTTP stack, with [`UreqTransport`] as
//!   the default
//!
//! # Example
//!
//! ```no_run
//! use osc_api::OscApi;
//!
//! fn main() -> osc_api::Result<()> {
//!     let api = OscApi::new("MyHomebrewTool/1.0")?;
//!     api.fetch_all()?;
//!
//!     for pkg in api.filter_packages(Some("games"), Some("mario")) {
//!         println!("{} {}", pkg.name, pkg.version);
//!     }
//!
//!     if let Some(featured) = api.get_featured_app()? {
//!         println!("Featured: {}", featured.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod category;
pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod newest;
pub mod package;

#[cfg(test)]
mod test_support;

pub use catalog::{Catalog, Snapshot};
pub use category::Category;
pub use client::{OscApi, OscApiBuilder, Resource};
pub use config::{ClientConfig, API_VERSION, DEFAULT_HOST};
pub use error::{ApiError, ConfigError, ErrorContext, FetchError, Result};
pub use http_client::{Transport, UreqTransport};
pub use newest::{newest_of, NewestIndex, OVERALL_KEY};
pub use package::{Asset, AssetType, Description, Flag, Package, ShopTitle};
