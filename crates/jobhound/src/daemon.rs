//! Wiring for the long-running daemon and single-cycle runs.

use std::sync::Arc;
use std::time::Duration;

use miette::Result;
use tokio::sync::watch;
use tracing::{error, info, warn};

use jobhound_admin::{AdminState, Commands};
use jobhound_discord::ForumClient;
use jobhound_pipeline::{
    CycleOutcome, DedupStore, LinkMethod, LinkResolver, ListingDetails, Scheduler,
    SettingsHandle,
};
use jobhound_search::{CustomSearchClient, SerpApiClient};

use crate::config::Config;

/// Build the scheduler and its adapters from `config`.
async fn build_scheduler(config: &Config, settings: SettingsHandle) -> Result<Scheduler> {
    let serpapi_key = config
        .serpapi_key
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| miette::miette!("missing SerpApi key (--serpapi-key / JOBHOUND_SERPAPI_KEY)"))?;
    let discord_token = config
        .discord_token
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            miette::miette!("missing Discord token (--discord-token / JOBHOUND_DISCORD_TOKEN)")
        })?;
    let channel_id = config
        .forum_channel_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            miette::miette!(
                "missing forum channel (--forum-channel-id / JOBHOUND_FORUM_CHANNEL_ID)"
            )
        })?;

    let serpapi = Arc::new(SerpApiClient::new(serpapi_key));

    let mut resolver = LinkResolver::new(Arc::clone(&serpapi) as Arc<dyn ListingDetails>);
    match config.web_search_credentials() {
        Some((key, cx)) => {
            resolver = resolver.with_web_search(Arc::new(CustomSearchClient::new(key, cx)));
        }
        None if config.link_method == LinkMethod::Scrape => {
            warn!("scraping link method selected without Custom Search credentials");
        }
        None => {}
    }

    let forum = ForumClient::new(discord_token, channel_id);
    match forum.verify_channel().await {
        Ok(channel) => info!(channel_id, name = ?channel.name, "posting to forum channel"),
        // Not fatal: every delivery re-checks the channel
        Err(e) => error!(channel_id, error = %e, "forum channel check failed"),
    }

    let store = DedupStore::new(config.jobs_file());
    info!(path = %store.path().display(), "using dedup file");

    Ok(Scheduler::new(serpapi, resolver, Arc::new(forum), store, settings)
        .with_interval(Duration::from_secs(config.interval.max(1))))
}

/// Run the scheduler loop and the admin server until ctrl-c.
pub async fn run(config: Config, admin_port: u16) -> Result<()> {
    info!("starting jobhound daemon");

    let settings = SettingsHandle::new(config.settings());
    let scheduler = Arc::new(build_scheduler(&config, settings.clone()).await?);

    if config.allowed_callers.is_empty() {
        warn!("no allowed callers configured, every command will be rejected");
    }

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Handle shutdown signals
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let admin_state = Arc::new(
        AdminState::new(Commands::new(settings, config.allowed_callers.clone()))
            .with_scheduler(Arc::clone(&scheduler)),
    );
    let admin_shutdown = shutdown_rx.clone();
    let admin_handle = tokio::spawn(async move {
        if let Err(e) = jobhound_admin::run_server(admin_state, admin_port, admin_shutdown).await {
            error!(error = %e, "admin server failed");
        }
    });

    scheduler.run(shutdown_rx).await;

    if let Err(e) = admin_handle.await {
        warn!(error = %e, "admin server task ended abnormally");
    }

    info!("jobhound daemon stopped");
    Ok(())
}

/// Run one cycle and print its report.
pub async fn run_once(config: Config) -> Result<()> {
    let settings = SettingsHandle::new(config.settings());
    let scheduler = build_scheduler(&config, settings).await?;

    match scheduler.run_cycle().await {
        CycleOutcome::Completed(report) => {
            let text = serde_json::to_string_pretty(&report)
                .map_err(|e| miette::miette!("failed to render report: {}", e))?;
            println!("{}", text);
            Ok(())
        }
        CycleOutcome::Failed(e) => Err(miette::miette!("cycle failed: {}", e)),
        CycleOutcome::Skipped => Err(miette::miette!("cycle skipped: another cycle is running")),
    }
}
