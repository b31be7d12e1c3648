// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook payload types and the embeds built for each source.

use chrono::{DateTime, Utc};
use mechfeed_core::{NormalizedMessage, SourceContext};
use serde::Serialize;

/// Embed colour for server channel alerts.
pub const STREAM_COLOR: u32 = 5727730;

/// Embed colour for feed alerts.
pub const FEED_COLOR: u32 = 16734296;

/// Discord rejects field values longer than this.
const FIELD_VALUE_LIMIT: usize = 1024;

const NO_IMGUR_LINK: &str = "No Imgur link found";

/// Body POSTed to a webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    /// Always `null`; everything is carried by the embed.
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: u32,
    pub fields: Vec<Field>,
    pub footer: Footer,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Field {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        let value = value.into();
        Self {
            name: name.to_string(),
            value: if value.is_empty() { "-".to_string() } else { truncate(value) },
            inline,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Footer {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub url: String,
}

/// Builds the payload for one matched message.
pub fn build_payload(
    context: &SourceContext,
    matched_expression: &str,
    message: &NormalizedMessage,
    username: &str,
    footer: &str,
    now: DateTime<Utc>,
) -> WebhookPayload {
    let alert = format!("`{matched_expression}`");
    let mut embed = match context {
        SourceContext::Stream { server, channel } => stream_embed(server, channel, &alert, message),
        SourceContext::Feed { .. } => feed_embed(&alert, message),
    };
    embed.footer = Footer {
        text: footer.to_string(),
    };
    embed.timestamp = now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

    WebhookPayload {
        content: None,
        embeds: vec![embed],
        username: username.to_string(),
    }
}

fn stream_embed(server: &str, channel: &str, alert: &str, message: &NormalizedMessage) -> Embed {
    let sent_by = match message.extra("author_global_name") {
        Some(global) => format!("{global} ({})", message.author()),
        None => message.author().to_string(),
    };
    let jump = format!(
        "https://discord.com/channels/{}/{}/{}",
        message.extra("guild_id").unwrap_or("@me"),
        message.origin_channel(),
        message.id()
    );

    Embed {
        title: None,
        url: None,
        color: STREAM_COLOR,
        fields: vec![
            Field::new("Server", server, true),
            Field::new("Channel", format!("#{channel}"), true),
            Field::new("Sent by", sent_by, true),
            Field::new("Jump to message", jump, false),
            Field::new("Matched alert", alert, true),
            Field::new("Message", message.content(), false),
        ],
        footer: Footer {
            text: String::new(),
        },
        timestamp: String::new(),
        image: None,
    }
}

fn feed_embed(alert: &str, message: &NormalizedMessage) -> Embed {
    let author = message.author();
    let posted_by =
        format!("u/{author} [[PM]](https://www.reddit.com/message/compose/?to={author})");

    Embed {
        title: message.extra("title").map(str::to_string),
        url: message.extra("url").map(str::to_string),
        color: FEED_COLOR,
        fields: vec![
            Field::new("Posted by", posted_by, true),
            Field::new("Category", message.extra("category").unwrap_or_default(), true),
            Field::new("Imgur Link", message.extra("album").unwrap_or(NO_IMGUR_LINK), false),
            Field::new("Matched alert", alert, false),
        ],
        footer: Footer {
            text: String::new(),
        },
        timestamp: String::new(),
        image: message.extra("thumbnail").map(|url| Image {
            url: url.to_string(),
        }),
    }
}

fn truncate(mut value: String) -> String {
    if value.chars().count() <= FIELD_VALUE_LIMIT {
        return value;
    }
    if let Some((idx, _)) = value.char_indices().nth(FIELD_VALUE_LIMIT - 1) {
        value.truncate(idx);
        value.push('…');
    }
    value
}
