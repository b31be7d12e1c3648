// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier delivering alerts to each owner's Discord webhook.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mechfeed_config::model::NotifyConfig;
use mechfeed_core::{MechfeedError, NormalizedMessage, Notifier, Owner, SourceContext};
use tracing::debug;

use crate::embed::build_payload;

pub struct WebhookNotifier {
    client: reqwest::Client,
    username: String,
    footer: String,
}

impl WebhookNotifier {
    pub fn new(
        username: impl Into<String>,
        footer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MechfeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MechfeedError::transport("failed to build HTTP client", e))?;
        Ok(Self {
            client,
            username: username.into(),
            footer: footer.into(),
        })
    }

    pub fn from_config(config: &NotifyConfig) -> Result<Self, MechfeedError> {
        Self::new(
            config.username.clone(),
            config.footer.clone(),
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        owner: &Owner,
        context: &SourceContext,
        matched_expression: &str,
        message: &NormalizedMessage,
    ) -> Result<(), MechfeedError> {
        let Some(webhook) = owner.notify_webhook.as_deref().filter(|w| !w.is_empty()) else {
            debug!(owner = %owner.id, "owner has no webhook, skipping notification");
            return Ok(());
        };

        let payload = build_payload(
            context,
            matched_expression,
            message,
            &self.username,
            &self.footer,
            Utc::now(),
        );

        let response = self
            .client
            .post(webhook)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MechfeedError::Notify {
                message: format!("webhook request for {} failed", owner.id),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MechfeedError::Fetch {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        debug!(owner = %owner.id, %context, id = message.id(), "notification delivered");
        Ok(())
    }
}
