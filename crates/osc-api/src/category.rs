use serde::{Deserialize, Serialize};

/// A category of packages as defined by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    /// Unique key, referenced by [`Package::category`](crate::Package::category).
    pub name: String,
    pub display_name: String,
}

/// Body of the repository information endpoint. Only the categories are kept.
#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryInformation {
    pub available_categories: Vec<Category>,
}
