//! In-memory package catalog.
//!
//! The catalog holds the latest known categories, packages and featured slug
//! as an immutable [`Snapshot`]. Writers build the next snapshot off to the
//! side and only take the lock to swap the pointer, so readers never wait on
//! a recompute and always see either the complete previous state or the
//! complete new one. The newest-package index lives in the same snapshot as
//! the package list it was computed from.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use crate::{
    error::{ApiError, Result},
    newest::NewestIndex,
    Category, Package,
};

/// Packages matching an optional exact category and an optional
/// case-insensitive name substring, in their original order.
pub fn filter_packages<'a>(
    packages: &'a [Package],
    category: Option<&str>,
    name: Option<&str>,
) -> Vec<&'a Package> {
    let name = name.map(str::to_lowercase);
    packages
        .iter()
        .filter(|pkg| {
            category.map_or(true, |category| pkg.category == category)
                && name
                    .as_deref()
                    .map_or(true, |name| pkg.name.to_lowercase().contains(name))
        })
        .collect()
}

/// A consistent view of the catalog at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    categories: Arc<Vec<Category>>,
    packages: Arc<Vec<Package>>,
    newest: Arc<NewestIndex>,
    featured_slug: Option<String>,
}

impl Snapshot {
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn newest(&self) -> &NewestIndex {
        &self.newest
    }

    /// Slug recorded by the last featured-app fetch.
    pub fn featured_slug(&self) -> Option<&str> {
        self.featured_slug.as_deref()
    }

    pub fn filter_packages(&self, category: Option<&str>, name: Option<&str>) -> Vec<&Package> {
        filter_packages(&self.packages, category, name)
    }

    /// Case-insensitive slug lookup. The first match wins.
    pub fn get_by_slug(&self, slug: &str) -> Option<&Package> {
        self.packages.iter().find(|pkg| pkg.slug_matches(slug))
    }

    /// Resolves the featured slug against the current package list.
    ///
    /// Returns `Ok(None)` when no featured app was ever recorded and
    /// [`ApiError::FeaturedAppNotFound`] when the recorded slug has no package.
    pub fn featured_app(&self) -> Result<Option<&Package>> {
        let Some(slug) = self.featured_slug.as_deref() else {
            return Ok(None);
        };

        self.get_by_slug(slug).map(Some).ok_or_else(|| {
            ApiError::FeaturedAppNotFound {
                slug: slug.to_string(),
            }
        })
    }

    /// The newest-package index resolved to packages.
    pub fn newest_packages(&self) -> HashMap<&str, &Package> {
        self.newest
            .iter()
            .filter_map(|(scope, slug)| Some((scope.as_str(), self.get_by_slug(slug)?)))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    state: RwLock<Arc<Snapshot>>,
    // Serializes writers; never held by readers.
    writer: Mutex<()>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot. Later updates do not affect it.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.snapshot().categories().to_vec()
    }

    pub fn list_packages(&self) -> Vec<Package> {
        self.snapshot().packages().to_vec()
    }

    pub fn filter_packages(&self, category: Option<&str>, name: Option<&str>) -> Vec<Package> {
        let snapshot = self.snapshot();
        filter_packages(snapshot.packages(), category, name)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<Package> {
        self.snapshot().get_by_slug(slug).cloned()
    }

    pub fn get_featured_app(&self) -> Result<Option<Package>> {
        Ok(self.snapshot().featured_app()?.cloned())
    }

    pub fn featured_slug(&self) -> Option<String> {
        self.snapshot().featured_slug().map(String::from)
    }

    /// Scope key to slug of the newest package in that scope.
    pub fn newest_slugs(&self) -> HashMap<String, String> {
        self.snapshot().newest().as_map().clone()
    }

    /// Scope key to the newest package in that scope.
    pub fn newest_packages(&self) -> HashMap<String, Package> {
        self.snapshot()
            .newest_packages()
            .into_iter()
            .map(|(scope, pkg)| (scope.to_string(), pkg.clone()))
            .collect()
    }

    /// Replaces the category list. The newest index is left as it is; it
    /// follows the package list.
    pub fn replace_categories(&self, categories: Vec<Category>) {
        self.update(|current| {
            Snapshot {
                categories: Arc::new(categories),
                ..current.clone()
            }
        });
    }

    /// Replaces the package list and recomputes the newest index from it.
    pub fn replace_packages(&self, packages: Vec<Package>) {
        self.update(|current| {
            let newest = NewestIndex::compute(&packages, &current.categories);
            Snapshot {
                packages: Arc::new(packages),
                newest: Arc::new(newest),
                ..current.clone()
            }
        });
    }

    pub fn set_featured_slug(&self, slug: String) {
        self.update(|current| {
            Snapshot {
                featured_slug: Some(slug),
                ..current.clone()
            }
        });
    }

    /// Builds the next snapshot from the current one and publishes it.
    ///
    /// `next` runs under the writer mutex only, so concurrent updates of
    /// different fields never drop each other's changes while readers keep
    /// getting the previous snapshot. The state lock is held just for the
    /// swap.
    fn update<F>(&self, next: F)
    where
        F: FnOnce(&Snapshot) -> Snapshot,
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = Arc::new(next(&self.snapshot()));
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread, time::Duration};

    use super::*;
    use crate::{
        newest::OVERALL_KEY,
        test_support::{category, package},
    };

    fn sample_catalog() -> Catalog {
        let catalog = Catalog::new();
        catalog.replace_categories(vec![
            category("games", "Games"),
            category("emulators", "Emulators"),
            category("utilities", "Utilities"),
        ]);
        catalog.replace_packages(vec![
            package("mariokart_wii_mod", "Mario Kart Fun", "games", 1_500_000_000),
            package("snes9xgx", "Snes9x GX", "emulators", 1_600_000_000),
            package("super-mario-war", "Super Mario War", "games", 1_400_000_000),
            package("mario_paint_tool", "Mario Paint Tool", "utilities", 1_450_000_000),
            package("pong", "Pong", "games", 1_300_000_000),
        ]);
        catalog
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.list_categories().is_empty());
        assert!(catalog.list_packages().is_empty());
        assert!(catalog.filter_packages(None, None).is_empty());
        assert!(catalog.get_by_slug("anything").is_none());
        assert!(catalog.get_featured_app().unwrap().is_none());
        assert!(catalog.newest_slugs().is_empty());
    }

    #[test]
    fn test_unfiltered_matches_list() {
        let catalog = sample_catalog();
        assert_eq!(catalog.filter_packages(None, None), catalog.list_packages());
    }

    #[test]
    fn test_list_preserves_order() {
        let catalog = sample_catalog();
        let slugs: Vec<_> = catalog.list_packages().into_iter().map(|p| p.slug).collect();
        assert_eq!(
            slugs,
            [
                "mariokart_wii_mod",
                "snes9xgx",
                "super-mario-war",
                "mario_paint_tool",
                "pong"
            ]
        );

        let names: Vec<_> = catalog
            .list_categories()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["games", "emulators", "utilities"]);
    }

    #[test]
    fn test_filter_by_category_and_name() {
        let catalog = sample_catalog();

        let result = catalog.filter_packages(Some("games"), Some("Mario"));
        let slugs: Vec<_> = result.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["mariokart_wii_mod", "super-mario-war"]);
    }

    #[test]
    fn test_filter_category_is_case_sensitive() {
        let catalog = sample_catalog();
        assert!(catalog.filter_packages(Some("Games"), None).is_empty());
        assert_eq!(catalog.filter_packages(Some("games"), None).len(), 3);
    }

    #[test]
    fn test_filter_name_is_case_insensitive() {
        let catalog = sample_catalog();
        let slugs: Vec<_> = catalog
            .filter_packages(None, Some("MARIO"))
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(
            slugs,
            ["mariokart_wii_mod", "super-mario-war", "mario_paint_tool"]
        );
    }

    #[test]
    fn test_get_by_slug_any_case() {
        let catalog = sample_catalog();
        for variant in ["snes9xgx", "SNES9XGX", "Snes9xGx"] {
            let pkg = catalog.get_by_slug(variant).unwrap();
            assert_eq!(pkg.slug, "snes9xgx");
        }
        assert!(catalog.get_by_slug("snes9x").is_none());
    }

    #[test]
    fn test_get_by_slug_first_duplicate_wins() {
        let catalog = Catalog::new();
        catalog.replace_packages(vec![
            package("Dup", "First", "games", 1),
            package("dup", "Second", "games", 2),
        ]);
        assert_eq!(catalog.get_by_slug("DUP").unwrap().name, "First");
    }

    #[test]
    fn test_featured_app_states() {
        let catalog = sample_catalog();
        assert!(catalog.get_featured_app().unwrap().is_none());

        catalog.set_featured_slug("Pong".to_string());
        assert_eq!(catalog.get_featured_app().unwrap().unwrap().slug, "pong");

        catalog.set_featured_slug("foo".to_string());
        match catalog.get_featured_app() {
            Err(ApiError::FeaturedAppNotFound { slug }) => assert_eq!(slug, "foo"),
            other => panic!("expected FeaturedAppNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_newest_index_per_category() {
        let catalog = sample_catalog();
        let newest = catalog.newest_slugs();

        assert_eq!(newest.get(OVERALL_KEY).map(String::as_str), Some("snes9xgx"));
        assert_eq!(newest.get("games").map(String::as_str), Some("mariokart_wii_mod"));
        assert_eq!(newest.get("emulators").map(String::as_str), Some("snes9xgx"));
        assert_eq!(newest.get("utilities").map(String::as_str), Some("mario_paint_tool"));
        assert_eq!(newest.len(), 4);

        let packages = catalog.newest_packages();
        assert_eq!(packages["games"].name, "Mario Kart Fun");
    }

    #[test]
    fn test_category_without_packages_has_no_entry() {
        let catalog = Catalog::new();
        catalog.replace_categories(vec![category("games", "Games"), category("demos", "Demos")]);
        catalog.replace_packages(vec![package("pong", "Pong", "games", 1_300_000_000)]);

        let newest = catalog.newest_slugs();
        assert!(!newest.contains_key("demos"));
        assert_eq!(newest.get("games").map(String::as_str), Some("pong"));
    }

    #[test]
    fn test_replace_categories_keeps_index() {
        let catalog = Catalog::new();
        catalog.replace_packages(vec![package("pong", "Pong", "games", 1_300_000_000)]);
        let before = catalog.snapshot();

        catalog.replace_categories(vec![category("games", "Games")]);
        let after = catalog.snapshot();

        assert_eq!(after.categories().len(), 1);
        assert!(Arc::ptr_eq(&before.newest, &after.newest));
        assert!(Arc::ptr_eq(&before.packages, &after.packages));
        assert_eq!(after.newest().overall(), Some("pong"));
        assert!(!after.newest().contains("games"));
    }

    #[test]
    fn test_replace_packages_is_total() {
        let catalog = sample_catalog();
        catalog.replace_packages(vec![
            package("wiimc", "WiiMC", "utilities", 1_000),
            package("pong", "Pong Deluxe", "games", 900),
        ]);

        let slugs: Vec<_> = catalog.list_packages().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, ["wiimc", "pong"]);
        assert!(catalog.get_by_slug("snes9xgx").is_none());
        assert_eq!(catalog.get_by_slug("pong").unwrap().name, "Pong Deluxe");

        let newest = catalog.newest_slugs();
        assert_eq!(newest.get(OVERALL_KEY).map(String::as_str), Some("wiimc"));
        assert_eq!(newest.get("games").map(String::as_str), Some("pong"));
        assert!(!newest.contains_key("emulators"));
    }

    #[test]
    fn test_snapshot_is_isolated_from_updates() {
        let catalog = sample_catalog();
        let before = catalog.snapshot();

        catalog.replace_packages(Vec::new());

        assert_eq!(before.packages().len(), 5);
        assert_eq!(before.newest().overall(), Some("snes9xgx"));
        assert!(catalog.snapshot().packages().is_empty());
        assert!(catalog.snapshot().newest().is_empty());
    }

    #[test]
    fn test_readers_never_see_torn_state() {
        let catalog = Catalog::new();
        catalog.replace_categories(vec![category("games", "Games")]);

        let generation = |n: i64| {
            (0..20)
                .map(|i| package(&format!("gen{n}-pkg{i}"), "Game", "games", n * 100 + i))
                .collect::<Vec<_>>()
        };
        catalog.replace_packages(generation(0));

        thread::scope(|scope| {
            scope.spawn(|| {
                for n in 1..200 {
                    catalog.replace_packages(generation(n));
                }
            });

            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        let snapshot = catalog.snapshot();
                        let newest = snapshot.newest().overall().unwrap();
                        // The index must point into the list it was published with.
                        assert!(snapshot.get_by_slug(newest).is_some());
                        assert_eq!(newest, snapshot.packages().last().unwrap().slug);
                    }
                });
            }
        });
    }

    #[test]
    fn test_concurrent_updates_of_different_fields() {
        let catalog = Catalog::new();

        thread::scope(|scope| {
            scope.spawn(|| catalog.replace_categories(vec![category("games", "Games")]));
            scope.spawn(|| catalog.replace_packages(vec![package("pong", "Pong", "games", 1)]));
            scope.spawn(|| catalog.set_featured_slug("pong".to_string()));
        });

        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.categories().len(), 1);
        assert_eq!(snapshot.packages().len(), 1);
        assert_eq!(snapshot.featured_slug(), Some("pong"));
        assert_eq!(snapshot.newest().overall(), Some("pong"));
    }

    #[test]
    fn test_reader_not_blocked_by_pending_update() {
        let catalog = sample_catalog();
        let (started_tx, started_rx) = mpsc::channel();
        let (read_tx, read_rx) = mpsc::channel::<()>();

        let writer = &catalog;
        thread::scope(|scope| {
            scope.spawn(move || {
                writer.update(|current| {
                    started_tx.send(()).unwrap();
                    // Stay inside the update until the reader is done, or give up.
                    let _ = read_rx.recv_timeout(Duration::from_secs(5));
                    Snapshot {
                        packages: Arc::new(Vec::new()),
                        newest: Arc::new(NewestIndex::default()),
                        ..current.clone()
                    }
                });
            });

            started_rx.recv().unwrap();
            let snapshot = catalog.snapshot();
            read_tx.send(()).unwrap();

            assert_eq!(snapshot.packages().len(), 5);
            assert_eq!(snapshot.newest().overall(), Some("snes9xgx"));
        });

        assert!(catalog.snapshot().packages().is_empty());
    }
}
