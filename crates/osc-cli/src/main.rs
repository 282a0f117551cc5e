use std::{env, path::PathBuf};

use clap::Parser;
use cli::{Args, Commands};
use list::{featured_package, list_categories, list_packages, newest_packages, query_package};
use logging::setup_logging;
use osc_api::{ClientConfig, OscApi, OscApiBuilder, Result};
use tracing::debug;
use utils::set_color;

mod cli;
mod list;
mod logging;
mod utils;

/// Config file used when neither `--config` nor `OSC_CONFIG` is given.
fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("osc").join("config.toml"))
}

fn load_config(args: &Args) -> Result<ClientConfig> {
    let path = args
        .config
        .clone()
        .map(PathBuf::from)
        .or_else(|| env::var_os("OSC_CONFIG").map(PathBuf::from))
        .or_else(default_config_path);

    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            ClientConfig::load(&path)?
        }
        None => ClientConfig::default(),
    };

    if let Some(host) = &args.host {
        config = config.with_host(host);
    }
    if let Some(user_agent) = &args.user_agent {
        config = config.with_user_agent(user_agent);
    }
    if let Some(timeout) = &args.timeout {
        config = config.with_timeout(timeout);
    }
    if config.user_agent.is_none() {
        config = config.with_user_agent(format!("osc-cli/{}", env!("CARGO_PKG_VERSION")));
    }

    Ok(config)
}

fn build_client(args: &Args) -> Result<OscApi> {
    let config = load_config(args)?;
    OscApiBuilder::from_config(config).build()
}

fn handle_cli() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args);
    set_color(!args.no_color);

    let api = build_client(&args)?;
    debug!(
        host = api.config().host,
        user_agent = api.user_agent(),
        "client ready"
    );

    match args.command {
        Commands::Categories => list_categories(&api)?,
        Commands::List { category, name } => list_packages(&api, category, name)?,
        Commands::Info { slug } => query_package(&api, &slug)?,
        Commands::Featured => featured_package(&api)?,
        Commands::Newest => newest_packages(&api)?,
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
