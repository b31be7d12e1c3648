// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for mechfeed.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so typos in config keys
//! are reported at startup instead of silently ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical Discord gateway URL (API v9, JSON encoding).
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=9&encoding=json";

/// GUILD_MESSAGES (1 << 9) + MESSAGE_CONTENT (1 << 15).
pub const DEFAULT_INTENTS: u64 = 33280;

/// Top-level mechfeed configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MechfeedConfig {
    /// Process-level settings: logging and supervision.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Discord gateway connector.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Reddit polling connector.
    #[serde(default)]
    pub reddit: RedditConfig,

    /// Webhook notification delivery.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Subscription owners.
    #[serde(default)]
    pub owners: Vec<OwnerConfig>,

    /// Keyword subscriptions.
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionConfig>,
}

/// Logging and supervisor settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub log_json: bool,

    /// Delay before a crashed connector is restarted.
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            restart_delay_ms: default_restart_delay_ms(),
        }
    }
}

impl DaemonConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_restart_delay_ms() -> u64 {
    300
}

/// Discord gateway connector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Run the gateway connector.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Gateway token. Required when `enabled`.
    #[serde(default)]
    pub token: Option<String>,

    /// Gateway URL dialed on a fresh start.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Intent bitmask sent with identify.
    #[serde(default = "default_intents")]
    pub intents: u64,

    /// Upper bound on any single dial or frame write.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Servers whose channels are monitored.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            gateway_url: default_gateway_url(),
            intents: default_intents(),
            request_timeout_secs: default_request_timeout_secs(),
            servers: Vec::new(),
        }
    }
}

impl DiscordConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// A monitored Discord server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

/// A monitored channel within a server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    pub name: String,
    pub id: String,
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_intents() -> u64 {
    DEFAULT_INTENTS
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

/// Reddit polling connector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RedditConfig {
    /// Run the polling connector.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Listing endpoint returning the newest posts first.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Name shown in notifications for this feed.
    #[serde(default = "default_feed_name")]
    pub feed_name: String,

    /// Time between polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// OAuth client id for bearer-token authentication. Optional.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret, paired with `client_id`.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Client-credentials token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Album resolution endpoint; the album id is appended as a path segment.
    #[serde(default = "default_album_url")]
    pub album_url: String,

    /// Imgur client id used for album resolution. Albums are not resolved
    /// without one.
    #[serde(default)]
    pub imgur_client_id: Option<String>,

    /// Upper bound on any single HTTP request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            feed_url: default_feed_url(),
            feed_name: default_feed_name(),
            poll_interval_ms: default_poll_interval_ms(),
            user_agent: default_user_agent(),
            client_id: None,
            client_secret: None,
            token_url: default_token_url(),
            album_url: default_album_url(),
            imgur_client_id: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RedditConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_feed_url() -> String {
    "https://www.reddit.com/r/mechmarket/new.json".to_string()
}

fn default_feed_name() -> String {
    "r/mechmarket".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    concat!("mechfeed/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_token_url() -> String {
    "https://www.reddit.com/api/v1/access_token".to_string()
}

fn default_album_url() -> String {
    "https://api.imgur.com/post/v1/albums".to_string()
}

/// Webhook notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Username the webhook posts as.
    #[serde(default = "default_notify_username")]
    pub username: String,

    /// Footer text on every embed.
    #[serde(default = "default_notify_username")]
    pub footer: String,

    /// Upper bound on a single webhook POST.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            username: default_notify_username(),
            footer: default_notify_username(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl NotifyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_notify_username() -> String {
    "mechfeed".to_string()
}

/// A subscription owner.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerConfig {
    pub id: String,

    #[serde(default)]
    pub username: String,

    /// Discord webhook URL receiving this owner's notifications.
    #[serde(default)]
    pub webhook: Option<String>,
}

/// A keyword subscription.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionConfig {
    pub owner_id: String,

    /// Comma-separated terms; prefix a term with `-` to exclude it.
    pub expression: String,

    #[serde(default)]
    pub ignored_authors: Vec<String>,
}
