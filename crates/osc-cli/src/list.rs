use nu_ansi_term::Color::{Blue, Cyan, Green, LightRed, Magenta, Yellow};
use osc_api::{ApiError, AssetType, OscApi, Package, Result, OVERALL_KEY};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::{debug, info, warn};

use crate::utils::{format_bytes, format_date, join_list, term_width, Colored, Icons};

pub fn list_categories(api: &OscApi) -> Result<()> {
    api.fetch_repository_information()?;

    for category in api.list_categories() {
        info!(
            name = category.name,
            display_name = category.display_name,
            "{} ({})",
            Colored(Blue, &category.display_name),
            Colored(Cyan, &category.name)
        );
    }

    Ok(())
}

pub fn list_packages(api: &OscApi, category: Option<String>, name: Option<String>) -> Result<()> {
    debug!(category = ?category, name = ?name, "listing packages");

    api.fetch_packages()?;

    let total = api.list_packages().len();
    let packages = api.filter_packages(category.as_deref(), name.as_deref());

    for package in &packages {
        info!(
            slug = package.slug,
            name = package.name,
            category = package.category,
            version = package.version,
            description = package.description.short,
            "{} ({}) {} | {} - {}{}",
            Colored(Blue, &package.name),
            Colored(Cyan, &package.slug),
            Colored(LightRed, &package.version),
            Colored(Magenta, &package.category),
            package.description.short,
            if package.is_deprecated() {
                format!(" {}", Colored(Yellow, "[deprecated]"))
            } else {
                String::new()
            }
        );
    }

    let mut builder = Builder::new();
    builder.push_record([
        format!("{} Matched", Icons::PACKAGE),
        format!("{}", Colored(Green, packages.len())),
    ]);
    builder.push_record([
        format!("{} Total", Icons::CATEGORY),
        format!("{}", Colored(Cyan, total)),
    ]);

    let table = builder
        .build()
        .with(Panel::header("Package List"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");

    Ok(())
}

pub fn query_package(api: &OscApi, slug: &str) -> Result<()> {
    debug!(slug = slug, "querying package info");

    api.fetch_packages()?;

    let package = api.get_by_slug(slug).ok_or_else(|| {
        ApiError::PackageNotFound {
            slug: slug.to_string(),
        }
    })?;
    print_package(&package, None);

    Ok(())
}

pub fn featured_package(api: &OscApi) -> Result<()> {
    api.fetch_packages()?;
    api.fetch_featured_app()?;

    match api.get_featured_app()? {
        Some(package) => print_package(&package, Some("Featured App")),
        None => warn!("The repository has no featured app"),
    }

    Ok(())
}

pub fn newest_packages(api: &OscApi) -> Result<()> {
    api.fetch_repository_information()?;
    api.fetch_packages()?;

    let snapshot = api.snapshot();
    let newest = snapshot.newest_packages();

    let mut builder = Builder::new();
    builder.push_record(["Scope", "Package", "Released"]);

    // Overall first, then categories in repository order.
    let scopes = std::iter::once((OVERALL_KEY, "Overall")).chain(
        snapshot
            .categories()
            .iter()
            .map(|c| (c.name.as_str(), c.display_name.as_str())),
    );

    for (scope, label) in scopes {
        let Some(package) = newest.get(scope) else {
            continue;
        };

        debug!(
            scope = scope,
            slug = package.slug,
            release_date = package.release_date,
            "newest package"
        );

        builder.push_record([
            label.to_string(),
            format!(
                "{} ({})",
                Colored(Blue, &package.name),
                Colored(Cyan, &package.slug)
            ),
            format_date(package.release_date),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header("Newest Packages"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!("\n{table}");

    Ok(())
}

fn print_package(package: &Package, header: Option<&str>) {
    let mut builder = Builder::new();

    builder.push_record([
        format!("{} Name", Icons::PACKAGE),
        format!(
            "{} ({})",
            Colored(Blue, &package.name),
            Colored(Cyan, &package.slug)
        ),
    ]);

    builder.push_record([
        format!("{} Description", Icons::DESCRIPTION),
        package.description.short.clone(),
    ]);

    builder.push_record([
        format!("{} Version", Icons::VERSION),
        Colored(LightRed, &package.version).to_string(),
    ]);

    builder.push_record([
        format!("{} Category", Icons::CATEGORY),
        Colored(Magenta, &package.category).to_string(),
    ]);

    let authors = join_list(&package.authors).unwrap_or_else(|| package.author.clone());
    builder.push_record([format!("{} Authors", Icons::AUTHOR), authors]);

    if let Some(contributors) = join_list(&package.contributors) {
        builder.push_record([format!("{} Contributors", Icons::AUTHOR), contributors]);
    }

    builder.push_record([
        format!("{} Released", Icons::CALENDAR),
        format_date(package.release_date),
    ]);

    builder.push_record([
        format!("{} Size", Icons::SIZE),
        Colored(Magenta, format_bytes(package.uncompressed_size, 2)).to_string(),
    ]);

    builder.push_record([
        format!("{} Downloads", Icons::DOWNLOADS),
        package.downloads.to_string(),
    ]);

    if let Some(platforms) = join_list(&package.supported_platforms) {
        builder.push_record([format!("{} Platforms", Icons::PACKAGE), platforms]);
    }

    if let Some(peripherals) = join_list(&package.peripherals) {
        builder.push_record([format!("{} Peripherals", Icons::PACKAGE), peripherals]);
    }

    if !package.flags.is_empty() {
        let flags = package
            .flags
            .iter()
            .map(|flag| flag.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        builder.push_record([
            format!("{} Flags", Icons::WARNING),
            Colored(Yellow, flags).to_string(),
        ]);
    }

    if let Some(archive) = package.asset(AssetType::Archive) {
        builder.push_record([
            format!("{} Download", Icons::LINK),
            Colored(Blue, &archive.url).to_string(),
        ]);
    }

    if !package.shop.title_id.is_empty() {
        builder.push_record([
            format!("{} Title ID", Icons::STAR),
            format!(
                "{} (v{})",
                package.shop.title_id, package.shop.title_version
            ),
        ]);
    }

    let mut table = builder.build();
    if let Some(header) = header {
        table.with(Panel::header(header));
    }
    let table = table
        .with(Style::rounded())
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!(
        slug = package.slug,
        name = package.name,
        category = package.category,
        version = package.version,
        description = package.description.short,
        release_date = package.release_date,
        downloads = package.downloads,
        "\n{table}"
    );
}
