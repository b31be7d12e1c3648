// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monitored server channels, keyed by channel id.

use std::collections::HashMap;

use mechfeed_config::model::ServerConfig;
use mechfeed_core::SourceContext;

#[derive(Debug, Clone, Default)]
pub struct ChannelDirectory {
    channels: HashMap<String, (String, String)>,
}

impl ChannelDirectory {
    /// Builds the directory from enabled servers only.
    pub fn from_config(servers: &[ServerConfig]) -> Self {
        let mut directory = Self::default();
        for server in servers.iter().filter(|s| s.enabled) {
            for channel in &server.channels {
                directory.insert(&channel.id, &server.name, &channel.name);
            }
        }
        directory
    }

    pub fn insert(&mut self, channel_id: &str, server: &str, channel: &str) {
        self.channels
            .insert(channel_id.to_string(), (server.to_string(), channel.to_string()));
    }

    /// Context for a monitored channel, `None` for anything else.
    pub fn lookup(&self, channel_id: &str) -> Option<SourceContext> {
        self.channels
            .get(channel_id)
            .map(|(server, channel)| SourceContext::Stream {
                server: server.clone(),
                channel: channel.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
