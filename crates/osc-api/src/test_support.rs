use crate::{Category, Package};

pub fn package(slug: &str, name: &str, category: &str, release_date: i64) -> Package {
    Package {
        slug: slug.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        release_date,
        ..Default::default()
    }
}

pub fn category(name: &str, display_name: &str) -> Category {
    Category {
        name: name.to_string(),
        display_name: display_name.to_string(),
    }
}
