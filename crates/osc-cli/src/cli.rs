use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Set repository host
    #[arg(required = false, long, global = true, value_hint = ValueHint::Url)]
    pub host: Option<String>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    /// Set request timeout (e.g. 30s, 1m30s)
    #[arg(required = false, long, global = true)]
    pub timeout: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List repository categories
    #[clap(name = "categories", visible_alias = "cats")]
    Categories,

    /// List packages
    #[clap(name = "list", visible_alias = "ls")]
    List {
        /// Only show packages in this category
        #[arg(required = false, long)]
        category: Option<String>,

        /// Only show packages whose name contains this text
        #[arg(required = false, short, long)]
        name: Option<String>,
    },

    /// Query package info
    #[command(arg_required_else_help = true)]
    #[clap(name = "info", visible_alias = "query")]
    Info {
        /// Package slug
        #[arg(required = true)]
        slug: String,
    },

    /// Show the featured app
    #[clap(name = "featured")]
    Featured,

    /// Show the newest package overall and per category
    #[clap(name = "newest")]
    Newest,
}
