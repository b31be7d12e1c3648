// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./mechfeed.toml` > `~/.config/mechfeed/mechfeed.toml` >
//! `/etc/mechfeed/mechfeed.toml`, with `MECHFEED_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MechfeedConfig;

/// Config file name searched for in every location.
pub const CONFIG_FILE_NAME: &str = "mechfeed.toml";

/// System-wide config path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mechfeed/mechfeed.toml";

/// Sections that can be targeted by environment variables.
const ENV_SECTIONS: &[&str] = &["daemon", "discord", "reddit", "notify"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mechfeed/mechfeed.toml`
/// 3. `~/.config/mechfeed/mechfeed.toml`
/// 4. `./mechfeed.toml`
/// 5. `MECHFEED_*` environment variables
pub fn load_config() -> Result<MechfeedConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MechfeedConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MechfeedConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MechfeedConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MechfeedConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for standard config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MechfeedConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// `$XDG_CONFIG_HOME/mechfeed/mechfeed.toml`, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mechfeed").join(CONFIG_FILE_NAME))
}

/// Environment provider mapping `MECHFEED_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `MECHFEED_REDDIT_CLIENT_SECRET` maps to `reddit.client_secret`.
fn env_provider() -> Env {
    Env::prefixed("MECHFEED_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
