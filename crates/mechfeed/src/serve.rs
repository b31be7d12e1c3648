// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mechfeed serve` command implementation.
//!
//! Starts every enabled connector under its own supervisor, feeds both
//! dispatch queues into the match pipeline, and delivers matches through
//! owner webhooks until SIGINT or SIGTERM.

use std::sync::Arc;

use mechfeed_config::MechfeedConfig;
use mechfeed_core::{dispatch_queue, Connector, MechfeedError, Source};
use mechfeed_discord::DiscordConnector;
use mechfeed_dispatch::{ChannelDirectory, MatchPipeline};
use mechfeed_notify::WebhookNotifier;
use mechfeed_reddit::RedditConnector;
use mechfeed_resilience::Supervisor;
use mechfeed_storage::MemoryStore;
use tracing::{info, warn};

use crate::shutdown;

/// Runs until a shutdown signal arrives and the pipeline has drained.
pub async fn run_serve(config: MechfeedConfig) -> Result<(), MechfeedError> {
    init_tracing(&config.daemon.log_level, config.daemon.log_json);

    info!(version = env!("CARGO_PKG_VERSION"), "starting mechfeed serve");

    let store = Arc::new(MemoryStore::from_config(
        &config.owners,
        &config.subscriptions,
    ));
    let notifier = Arc::new(WebhookNotifier::from_config(&config.notify)?);
    let directory = ChannelDirectory::from_config(&config.discord.servers);
    info!(
        owners = config.owners.len(),
        subscriptions = config.subscriptions.len(),
        channels = directory.len(),
        "subscriptions loaded"
    );

    let (stream_tx, stream_rx) = dispatch_queue(Source::Stream);
    let (feed_tx, feed_rx) = dispatch_queue(Source::Feed);

    let cancel = shutdown::install_signal_handler();
    let restart_delay = config.daemon.restart_delay();
    let mut supervisors = Vec::new();

    if config.discord.enabled {
        if directory.is_empty() {
            warn!("discord connector enabled but no channels are monitored");
        }
        let connector: Arc<dyn Connector> = Arc::new(DiscordConnector::from_config(&config.discord)?);
        let supervisor = Supervisor::new(connector, restart_delay);
        supervisors.push(supervisor.spawn(stream_tx.clone(), cancel.clone()));
    } else {
        info!("discord connector disabled");
    }

    if config.reddit.enabled {
        let connector: Arc<dyn Connector> = Arc::new(RedditConnector::from_config(&config.reddit)?);
        let supervisor = Supervisor::new(connector, restart_delay);
        supervisors.push(supervisor.spawn(feed_tx.clone(), cancel.clone()));
    } else {
        info!("reddit connector disabled");
    }

    // Only supervisors hold senders from here on, so the pipeline sees the
    // queues close once they have all stopped.
    drop(stream_tx);
    drop(feed_tx);

    if supervisors.is_empty() {
        warn!("no connectors enabled, nothing to do");
        return Ok(());
    }

    let pipeline = MatchPipeline::new(store, notifier, directory, config.reddit.feed_name.clone());
    pipeline.run(stream_rx, feed_rx, cancel).await;

    for handle in supervisors {
        if let Err(e) = handle.await {
            warn!(error = %e, "supervisor task ended abnormally");
        }
    }

    info!("mechfeed serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mechfeed={log_level},warn")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
