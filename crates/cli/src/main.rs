//! jobrun CLI - validate instance options before starting the runtime

mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobrun_core::application::resolve_node;
use jobrun_core::{CapabilityRegistry, Config, ConfigBuilder};
use jobrun_infra_system::{load_options, SystemEnvironment};

const DEFAULT_OPTIONS_PATH: &str = "~/.jobrun/options.toml";

#[derive(Parser)]
#[command(name = "jobrun")]
#[command(about = "jobrun instance configuration checker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Options file (TOML, JSON or YAML); defaults to ~/.jobrun/options.toml if present
    #[arg(long, short, global = true, env = "JOBRUN_OPTIONS")]
    file: Option<PathBuf>,

    /// Distributed-runtime identity this process has joined, if any
    #[arg(long, global = true, env = "JOBRUN_CLUSTER_IDENTITY")]
    cluster_identity: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and validate the configuration
    Check {
        /// Print the validated record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the instance identity
    Ident,

    /// Print the resolved node name for this process
    Node,
}

fn init_logging() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    let log_format = std::env::var("JOBRUN_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("jobrun=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

/// Explicit path, else the default path when it exists
fn options_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let default = PathBuf::from(shellexpand::tilde(DEFAULT_OPTIONS_PATH).into_owned());
        default.exists().then_some(default)
    })
}

fn build(path: Option<&Path>, env: &SystemEnvironment) -> Result<Config> {
    let loaded = load_options(path).context("Failed to load options")?;

    let mut registry = CapabilityRegistry::with_builtins();
    loaded.declare_into(&mut registry);
    debug!(registry = ?registry, "Capability registry ready");

    Ok(ConfigBuilder::new(env, &registry).build(loaded.options)?)
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let mut env = SystemEnvironment::new();
    if let Some(identity) = cli.cluster_identity {
        env = env.with_cluster_identity(identity);
    }
    let path = options_path(cli.file);

    match cli.command {
        Commands::Check { json } => match build(path.as_deref(), &env) {
            Ok(config) if json => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            Ok(config) => {
                println!("{}", "✓ Configuration is valid".green().bold());
                println!();
                println!("{}", report::summary_table(&config));
            }
            Err(e) => {
                eprintln!("{} {:#}", "✗ Invalid configuration:".red().bold(), e);
                std::process::exit(1);
            }
        },

        Commands::Ident => {
            let config = build(path.as_deref(), &env)?;
            println!("{}", config.to_ident());
        }

        Commands::Node => {
            let node = resolve_node(&env).context("Failed to resolve node name")?;
            println!("{}", node);
        }
    }

    Ok(())
}
