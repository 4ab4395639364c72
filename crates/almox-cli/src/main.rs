mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{code::CodeSubcommand, config::ConfigSubcommand, item::ItemSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "almox",
    about = "Warehouse inventory codes — propose, check, and register sequential item codes",
    version,
    propagate_version = true
)]
struct Cli {
    /// Warehouse root (default: auto-detect from .almox/ or .git/)
    #[arg(long, global = true, env = "ALMOX_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize almox in the current directory
    Init {
        /// Warehouse name (default: directory name)
        #[arg(long)]
        name: Option<String>,
        /// Prefix for the first code of an empty store
        #[arg(long)]
        prefix: Option<String>,
        /// Zero-padding width for the first code of an empty store
        #[arg(long)]
        width: Option<usize>,
    },

    /// Propose and check item codes
    Code {
        #[command(subcommand)]
        subcommand: CodeSubcommand,
    },

    /// Register and inspect inventory items
    Item {
        #[command(subcommand)]
        subcommand: ItemSubcommand,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init {
            name,
            prefix,
            width,
        } => cmd::init::run(&root, name, prefix, width, cli.json),
        Commands::Code { subcommand } => cmd::code::run(&root, subcommand, cli.json),
        Commands::Item { subcommand } => cmd::item::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
