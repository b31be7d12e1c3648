// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.
//!
//! Every rule is evaluated; the caller gets the full list of failures.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::MechfeedConfig;

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &MechfeedConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.daemon.restart_delay_ms == 0 {
        errors.push(ConfigError::validation(
            "daemon.restart_delay_ms must be greater than zero",
        ));
    }

    validate_discord(config, &mut errors);
    validate_reddit(config, &mut errors);

    if config.notify.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "notify.request_timeout_secs must be greater than zero",
        ));
    }

    validate_subscriptions(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_discord(config: &MechfeedConfig, errors: &mut Vec<ConfigError>) {
    let discord = &config.discord;
    if !discord.enabled {
        return;
    }

    if discord.token.as_deref().is_none_or(|t| t.trim().is_empty()) {
        errors.push(ConfigError::validation(
            "discord.token is required while the discord connector is enabled \
             (set it in mechfeed.toml or MECHFEED_DISCORD_TOKEN)",
        ));
    }
    if discord.gateway_url.trim().is_empty() {
        errors.push(ConfigError::validation("discord.gateway_url must not be empty"));
    }
    if discord.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "discord.request_timeout_secs must be greater than zero",
        ));
    }

    let mut channel_ids = HashSet::new();
    for server in &discord.servers {
        for channel in &server.channels {
            if channel.id.trim().is_empty() {
                errors.push(ConfigError::validation(format!(
                    "discord.servers: channel `{}` in `{}` has an empty id",
                    channel.name, server.name
                )));
            } else if !channel_ids.insert(channel.id.as_str()) {
                errors.push(ConfigError::validation(format!(
                    "discord.servers: channel id `{}` is listed more than once",
                    channel.id
                )));
            }
        }
    }
}

fn validate_reddit(config: &MechfeedConfig, errors: &mut Vec<ConfigError>) {
    let reddit = &config.reddit;
    if !reddit.enabled {
        return;
    }

    if reddit.feed_url.trim().is_empty() {
        errors.push(ConfigError::validation("reddit.feed_url must not be empty"));
    }
    if reddit.poll_interval_ms == 0 {
        errors.push(ConfigError::validation(
            "reddit.poll_interval_ms must be greater than zero",
        ));
    }
    if reddit.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "reddit.request_timeout_secs must be greater than zero",
        ));
    }

    match (&reddit.client_id, &reddit.client_secret) {
        (Some(_), None) | (None, Some(_)) => errors.push(ConfigError::validation(
            "reddit.client_id and reddit.client_secret must be set together",
        )),
        (Some(_), Some(_)) if reddit.token_url.trim().is_empty() => errors.push(
            ConfigError::validation("reddit.token_url must not be empty when credentials are set"),
        ),
        _ => {}
    }

    if reddit.imgur_client_id.is_some() && reddit.album_url.trim().is_empty() {
        errors.push(ConfigError::validation(
            "reddit.album_url must not be empty when imgur_client_id is set",
        ));
    }
}

fn validate_subscriptions(config: &MechfeedConfig, errors: &mut Vec<ConfigError>) {
    let mut owner_ids = HashSet::new();
    for owner in &config.owners {
        if owner.id.trim().is_empty() {
            errors.push(ConfigError::validation("owners: id must not be empty"));
        } else if !owner_ids.insert(owner.id.as_str()) {
            errors.push(ConfigError::validation(format!(
                "owners: duplicate owner id `{}`",
                owner.id
            )));
        }
        if owner.webhook.as_deref().is_some_and(|w| w.trim().is_empty()) {
            errors.push(ConfigError::validation(format!(
                "owners: webhook for `{}` must not be empty when present",
                owner.id
            )));
        }
    }

    for (index, sub) in config.subscriptions.iter().enumerate() {
        if !owner_ids.contains(sub.owner_id.as_str()) {
            errors.push(ConfigError::validation(format!(
                "subscriptions[{index}]: owner `{}` is not defined in [[owners]]",
                sub.owner_id
            )));
        }
        if sub.expression.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "subscriptions[{index}]: expression must not be blank"
            )));
        }
    }
}
