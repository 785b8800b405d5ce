//! Jobhound: Google Jobs to Discord forum notifier
//!
//! Main binary with subcommands:
//! - `daemon`: Scheduler loop plus the admin command server
//! - `run-once`: A single cycle, then exit
//! - `settings`: Print the effective startup settings

use clap::{Parser, Subcommand};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod daemon;

use config::Config;

#[derive(Parser)]
#[command(name = "jobhound")]
#[command(about = "Posts new Google Jobs listings to a Discord forum", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler and the admin server until ctrl-c
    Daemon {
        #[command(flatten)]
        config: Config,

        /// Admin server port
        #[arg(long, env = "JOBHOUND_ADMIN_PORT", default_value = "8787")]
        admin_port: u16,
    },

    /// Run a single cycle and print its report
    RunOnce {
        #[command(flatten)]
        config: Config,
    },

    /// Print the effective settings and exit
    Settings {
        #[command(flatten)]
        config: Config,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "jobhound=info,jobhound_pipeline=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon { config, admin_port } => daemon::run(config, admin_port).await,
        Commands::RunOnce { config } => daemon::run_once(config).await,
        Commands::Settings { config } => print_settings(&config),
    }
}

fn print_settings(config: &Config) -> Result<()> {
    let view = jobhound_admin::SettingsView::from(&config.settings());
    let output = serde_json::json!({
        "location": view.location,
        "query": view.query,
        "link_method": view.link_method,
        "interval_secs": config.interval,
        "jobs_file": config.jobs_file().display().to_string(),
        "web_search": config.web_search_credentials().is_some(),
        "allowed_callers": config.allowed_callers,
    });

    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| miette::miette!("failed to render settings: {}", e))?;
    println!("{}", text);
    Ok(())
}
