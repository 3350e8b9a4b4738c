//! Quillbase CLI - bootstrap and serve the publishing backend

use clap::{Parser, Subcommand};
use quillbase::config::{AppConfig, load_config};
use quillbase::{bootstrap, server};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "quillbase")]
#[command(version = "0.1.0")]
#[command(about = "Self-hosted publishing backend")]
#[command(long_about = r#"
Quillbase bootstraps a content store and serves it:
  • Idempotent schema bootstrap over SQLite or MySQL
  • Probe-guarded migrations applied on every start
  • Layered site settings resolved from the store

Example usage:
  quillbase init --config quillbase.toml
  quillbase serve
  quillbase config basic.web_site_title
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the store and start serving
    Serve {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Bootstrap the store, then exit
    Init {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Resolve a settings path (e.g. basic.web_site_title)
    Config {
        /// Dotted settings path
        path: String,

        /// Fallback when the path is absent
        #[arg(short, long, default_value = "")]
        default: String,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Serve { config } | Commands::Init { config } => config.clone(),
        Commands::Config { config, .. } => config.clone(),
    };
    let (config, config_file) = load_config(config_path.as_deref())?;

    let quiet = matches!(cli.command, Commands::Config { .. });
    init_logging(cli.verbose, quiet, &config);
    tracing::info!("config file used: {}", config_file.display());

    match cli.command {
        Commands::Serve { .. } => {
            let ctx = bootstrap::initialize(config, config_file)?;
            println!("🚀 Quillbase ready ({} dialect)", ctx.store().dialect().name());

            tokio::runtime::Runtime::new()?.block_on(server::start_server(ctx))?;
        }

        Commands::Init { .. } => {
            let ctx = bootstrap::initialize(config, config_file)?;
            println!("✅ Store ready ({} dialect)", ctx.store().dialect().name());
            println!("   Site: {}", ctx.resolve_str("basic.web_site_title", "(untitled)"));
        }

        Commands::Config { path, default, .. } => {
            let ctx = bootstrap::initialize(config, config_file)?;
            println!("{}", ctx.resolve_str(&path, &default));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool, config: &AppConfig) {
    // the trace level is reserved for debug-mode runs
    let filter = if config.server.debug {
        EnvFilter::new("trace")
    } else if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::new(config.log.level.as_str())
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
