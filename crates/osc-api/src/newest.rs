//! Newest-package index.
//!
//! Maps a scope key to the slug of the most recently released package in that
//! scope. The scope is either [`OVERALL_KEY`] for the whole catalog or a
//! category name. The index is always computed from scratch.

use std::collections::{hash_map, HashMap};

use crate::{catalog::filter_packages, Category, Package};

/// Scope key of the newest package across the whole catalog.
pub const OVERALL_KEY: &str = "newest";

/// Returns the package with the greatest release date.
///
/// Ties keep the package that comes first in `selection`. Packages without a
/// positive release date are never picked, so a selection that is empty or
/// entirely undated has no newest package.
pub fn newest_of<'a, I>(selection: I) -> Option<&'a Package>
where
    I: IntoIterator<Item = &'a Package>,
{
    let mut newest_date = 0;
    let mut selected = None;
    for package in selection {
        if package.release_date > newest_date {
            newest_date = package.release_date;
            selected = Some(package);
        }
    }
    selected
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewestIndex {
    entries: HashMap<String, String>,
}

impl NewestIndex {
    /// Computes the full index for `packages`.
    ///
    /// Categories without any dated package get no entry. A category literally
    /// named [`OVERALL_KEY`] replaces the overall entry.
    pub fn compute(packages: &[Package], categories: &[Category]) -> Self {
        let mut entries = HashMap::with_capacity(categories.len() + 1);

        if let Some(newest) = newest_of(packages) {
            entries.insert(OVERALL_KEY.to_string(), newest.slug.clone());
        }

        for category in categories {
            let selection = filter_packages(packages, Some(category.name.as_str()), None);
            if let Some(newest) = newest_of(selection) {
                entries.insert(category.name.clone(), newest.slug.clone());
            }
        }

        Self {
            entries,
        }
    }

    /// Slug of the newest package in `scope`.
    pub fn get(&self, scope: &str) -> Option<&str> {
        self.entries.get(scope).map(String::as_str)
    }

    /// Slug of the newest package overall.
    pub fn overall(&self) -> Option<&str> {
        self.get(OVERALL_KEY)
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.entries.contains_key(scope)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a NewestIndex {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{category, package};

    #[test]
    fn test_first_maximum_wins() {
        let packages = vec![
            package("a", "A", "games", 100),
            package("b", "B", "games", 300),
            package("c", "C", "games", 300),
            package("d", "D", "games", 50),
        ];

        let newest = newest_of(&packages).unwrap();
        assert!(std::ptr::eq(newest, &packages[1]));
        assert_eq!(newest.slug, "b");
    }

    #[test]
    fn test_empty_selection() {
        let packages: Vec<Package> = Vec::new();
        assert!(newest_of(&packages).is_none());
    }

    #[test]
    fn test_undated_packages_are_never_newest() {
        let packages = vec![
            package("old", "Old", "demos", -5),
            package("zero", "Zero", "demos", 0),
        ];
        assert!(newest_of(&packages).is_none());

        let packages = vec![
            package("zero", "Zero", "demos", 0),
            package("dated", "Dated", "demos", 1),
        ];
        assert_eq!(newest_of(&packages).unwrap().slug, "dated");
    }

    #[test]
    fn test_undated_category_has_no_entry() {
        let categories = vec![category("games", "Games"), category("demos", "Demos")];
        let packages = vec![
            package("pong", "Pong", "games", 1_200_000_000),
            package("intro", "Intro", "demos", 0),
        ];

        let index = NewestIndex::compute(&packages, &categories);
        assert_eq!(index.overall(), Some("pong"));
        assert!(!index.contains("demos"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_compute_index() {
        let categories = vec![
            category("games", "Games"),
            category("emulators", "Emulators"),
            category("media", "Media"),
        ];
        let packages = vec![
            package("snes9xgx", "Snes9x GX", "emulators", 1_600_000_000),
            package("sm64", "Super Mario 64 Port", "games", 1_700_000_000),
            package("fceugx", "FCE Ultra GX", "emulators", 1_650_000_000),
            package("pong", "Pong", "games", 1_200_000_000),
        ];

        let index = NewestIndex::compute(&packages, &categories);
        assert_eq!(index.overall(), Some("sm64"));
        assert_eq!(index.get("games"), Some("sm64"));
        assert_eq!(index.get("emulators"), Some("fceugx"));
        assert!(!index.contains("media"));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_compute_ignores_unknown_categories() {
        let categories = vec![category("games", "Games")];
        let packages = vec![
            package("wiimc", "WiiMC", "media", 1_900_000_000),
            package("pong", "Pong", "games", 1_200_000_000),
        ];

        let index = NewestIndex::compute(&packages, &categories);
        assert_eq!(index.overall(), Some("wiimc"));
        assert_eq!(index.get("games"), Some("pong"));
        assert!(index.get("media").is_none());
    }

    #[test]
    fn test_compute_empty() {
        let index = NewestIndex::compute(&[], &[category("games", "Games")]);
        assert!(index.is_empty());
        assert!(index.overall().is_none());
    }
}
