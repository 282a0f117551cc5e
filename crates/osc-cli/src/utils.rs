use std::{
    fmt::Display,
    sync::{LazyLock, PoisonError, RwLock},
};

use chrono::DateTime;
use nu_ansi_term::Color;

pub struct Icons;

impl Icons {
    pub const AUTHOR: &str = "👤";
    pub const CALENDAR: &str = "📅";
    pub const CATEGORY: &str = "📁";
    pub const DESCRIPTION: &str = "📝";
    pub const DOWNLOADS: &str = "⬇";
    pub const LINK: &str = "🔗";
    pub const PACKAGE: &str = "📦";
    pub const SIZE: &str = "💾";
    pub const STAR: &str = "⭐";
    pub const VERSION: &str = "🏁";
    pub const WARNING: &str = "⚠";
}

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn set_color(enabled: bool) {
    *COLOR.write().unwrap_or_else(PoisonError::into_inner) = enabled;
}

pub fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = *COLOR.read().unwrap_or_else(PoisonError::into_inner);
        if color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Formats a byte count with binary units, e.g. `1.50 MiB`.
pub fn format_bytes(bytes: u64, precision: usize) -> String {
    let unit = 1024.0;
    let sizes = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

    let idx = if bytes == 0 {
        0
    } else {
        ((bytes as f64).log(unit).floor() as usize).min(sizes.len() - 1)
    };

    format!(
        "{:.*} {}",
        precision,
        bytes as f64 / unit.powi(idx as i32),
        sizes[idx]
    )
}

/// Formats a Unix timestamp as a UTC calendar date.
pub fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Joins a list for display, or returns `None` when it is empty.
pub fn join_list(values: &[String]) -> Option<String> {
    (!values.is_empty()).then(|| values.join(", "))
}
