//! Package data structures.
//!
//! This module defines [`Package`], one application served by the repository,
//! along with its nested asset, shop title and description records. Decoding
//! is lenient: apart from `slug` and `name`, missing or `null` fields fall
//! back to empty values, and asset types or flags outside the known
//! vocabulary are dropped instead of failing the whole catalog.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

/// A value outside a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Kind of downloadable asset attached to a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Archive,
    Binary,
    Icon,
    Meta,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [Self::Archive, Self::Binary, Self::Icon, Self::Meta];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Binary => "binary",
            Self::Icon => "icon",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                UnknownVariant {
                    kind: "asset type",
                    value: s.to_string(),
                }
            })
    }
}

/// Flags a package can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Not recommended unless necessary; an alternative should be used instead.
    Deprecated,
    /// The application can write to the console's NAND.
    WritesToNand,
}

impl Flag {
    pub const ALL: [Flag; 2] = [Self::Deprecated, Self::WritesToNand];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deprecated => "deprecated",
            Self::WritesToNand => "writes_to_nand",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| {
                UnknownVariant {
                    kind: "flag",
                    value: s.to_string(),
                }
            })
    }
}

/// A downloadable file belonging to a package.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Asset {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hash: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
}

/// Title information used when the package is installed through the shop.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShopTitle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub contents_size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inodes: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title_version: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tmd_size: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Description {
    #[serde(default, deserialize_with = "null_as_default")]
    pub short: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub long: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn known_assets<'de, D>(deserializer: D) -> Result<BTreeMap<AssetType, Asset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Asset>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, asset)| {
            match key.parse::<AssetType>() {
                Ok(asset_type) => Some((asset_type, asset)),
                Err(err) => {
                    debug!("Ignoring {}", err);
                    None
                }
            }
        })
        .collect())
}

fn known_flags<'de, D>(deserializer: D) -> Result<BTreeSet<Flag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| {
            value
                .parse::<Flag>()
                .map_err(|err| debug!("Ignoring {}", err))
                .ok()
        })
        .collect())
}

/// A package available on the Open Shop Channel.
///
/// # Required Fields
///
/// - `slug` - Unique identifier, compared case-insensitively
/// - `name` - Human-readable name
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Package {
    pub slug: String,
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub contributors: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub downloads: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Description,

    #[serde(default, deserialize_with = "known_assets")]
    pub assets: BTreeMap<AssetType, Asset>,

    #[serde(default, deserialize_with = "known_flags")]
    pub flags: BTreeSet<Flag>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub package_type: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub peripherals: Vec<String>,

    /// Unix timestamp in seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub shop: ShopTitle,

    #[serde(default, deserialize_with = "null_as_default")]
    pub subdirectories: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub supported_platforms: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub uncompressed_size: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

impl Package {
    pub fn asset(&self, asset_type: AssetType) -> Option<&Asset> {
        self.assets.get(&asset_type)
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_deprecated(&self) -> bool {
        self.has_flag(Flag::Deprecated)
    }

    pub fn writes_to_nand(&self) -> bool {
        self.has_flag(Flag::WritesToNand)
    }

    /// Case-insensitive comparison against this package's slug.
    pub fn slug_matches(&self, slug: &str) -> bool {
        self.slug
            .chars()
            .flat_map(char::to_lowercase)
            .eq(slug.chars().flat_map(char::to_lowercase))
    }
}
