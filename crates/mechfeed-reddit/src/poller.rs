// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pull connector polling the newest-posts listing.

use std::time::Duration;

use async_trait::async_trait;
use mechfeed_config::model::RedditConfig;
use mechfeed_core::{Connector, DispatchSender, MechfeedError};
use secrecy::SecretString;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::auth::TokenProvider;
use crate::cursor::{PollCursor, PollPlan};
use crate::listing::{Listing, Post};
use crate::media::MediaResolver;

pub struct RedditConnector {
    client: reqwest::Client,
    feed_url: String,
    interval: Duration,
    auth: Option<TokenProvider>,
    media: MediaResolver,
}

impl RedditConnector {
    pub fn from_config(config: &RedditConfig) -> Result<Self, MechfeedError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| MechfeedError::transport("failed to build HTTP client", e))?;

        let auth = match (&config.client_id, &config.client_secret) {
            (Some(id), Some(secret)) => Some(TokenProvider::new(
                client.clone(),
                config.token_url.clone(),
                id.clone(),
                SecretString::from(secret.clone()),
            )),
            (None, None) => None,
            _ => {
                return Err(MechfeedError::Config(
                    "reddit.client_id and reddit.client_secret must be set together".into(),
                ));
            }
        };

        let media = MediaResolver::new(
            client.clone(),
            config.album_url.clone(),
            config.imgur_client_id.clone(),
        );

        Ok(Self {
            client,
            feed_url: config.feed_url.clone(),
            interval: config.poll_interval(),
            auth,
            media,
        })
    }

    /// Fetches the newest page, newest first.
    pub async fn fetch_page(&self) -> Result<Vec<Post>, MechfeedError> {
        let mut request = self.client.get(&self.feed_url);
        if let Some(auth) = &self.auth {
            request = request.bearer_auth(auth.bearer().await?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MechfeedError::transport("listing request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MechfeedError::Fetch {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| MechfeedError::decode("malformed listing", e))?;
        Ok(listing.into_posts())
    }

    /// One poll: fetch, deduplicate against `cursor`, emit new posts oldest
    /// first. Returns how many were emitted.
    pub async fn poll_once(
        &self,
        cursor: &mut PollCursor,
        queue: &DispatchSender,
    ) -> Result<usize, MechfeedError> {
        let page = self.fetch_page().await?;

        match cursor.plan(&page, |post| post.id.as_str()) {
            PollPlan::Prime(newest) => {
                info!(newest = %newest, "poll cursor primed");
                cursor.advance(newest);
                Ok(0)
            }
            PollPlan::Unchanged => Ok(0),
            PollPlan::Process { items, newest } => {
                let count = items.len();
                for post in items {
                    let body = post.selftext_html.as_deref().unwrap_or_default();
                    let media = self.media.media_for(body).await;
                    debug!(id = %post.id, thumbnail = ?media.thumbnail, "new post");
                    queue.push(post.clone().into_message(media))?;
                }
                cursor.advance(newest);
                Ok(count)
            }
        }
    }
}

#[async_trait]
impl Connector for RedditConnector {
    fn name(&self) -> &str {
        "reddit"
    }

    async fn run(&self, queue: DispatchSender) -> Result<(), MechfeedError> {
        let mut cursor = PollCursor::new();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(url = %self.feed_url, interval = ?self.interval, "polling feed");
        loop {
            ticker.tick().await;
            match self.poll_once(&mut cursor, &queue).await {
                Ok(0) => {}
                Ok(count) => debug!(count, "emitted new posts"),
                Err(e) if queue.is_closed() => return Err(e),
                Err(e) => warn!(error = %e, "poll failed, retrying next tick"),
            }
        }
    }
}
