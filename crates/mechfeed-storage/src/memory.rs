// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory subscription store.

use std::collections::HashMap;

use async_trait::async_trait;
use mechfeed_config::model::{OwnerConfig, SubscriptionConfig};
use mechfeed_core::{MechfeedError, Owner, Subscription, SubscriptionStore};
use tokio::sync::RwLock;
use tracing::debug;

struct Contents {
    owners: HashMap<String, Owner>,
    subscriptions: Vec<Subscription>,
}

/// Owners and subscriptions held in memory. Every read returns a snapshot.
pub struct MemoryStore {
    contents: RwLock<Contents>,
}

impl MemoryStore {
    pub fn new(owners: Vec<Owner>, subscriptions: Vec<Subscription>) -> Self {
        let owners = owners.into_iter().map(|o| (o.id.clone(), o)).collect();
        Self {
            contents: RwLock::new(Contents {
                owners,
                subscriptions,
            }),
        }
    }

    pub fn from_config(owners: &[OwnerConfig], subscriptions: &[SubscriptionConfig]) -> Self {
        let owners = owners
            .iter()
            .map(|o| Owner {
                id: o.id.clone(),
                username: o.username.clone(),
                notify_webhook: o.webhook.clone(),
            })
            .collect();
        let subscriptions = subscriptions
            .iter()
            .map(|s| {
                let mut sub = Subscription::new(s.owner_id.clone(), s.expression.clone());
                sub.ignored_authors = s.ignored_authors.iter().cloned().collect();
                sub
            })
            .collect();
        Self::new(owners, subscriptions)
    }

    pub async fn insert_subscription(&self, subscription: Subscription) {
        self.contents.write().await.subscriptions.push(subscription);
    }

    /// Removes every subscription of `owner_id` with exactly `expression`.
    pub async fn remove_subscription(&self, owner_id: &str, expression: &str) -> usize {
        let mut contents = self.contents.write().await;
        let before = contents.subscriptions.len();
        contents
            .subscriptions
            .retain(|s| !(s.owner_id == owner_id && s.expression == expression));
        before - contents.subscriptions.len()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn subscriptions(&self) -> Result<Vec<Subscription>, MechfeedError> {
        let contents = self.contents.read().await;
        debug!(count = contents.subscriptions.len(), "subscription snapshot");
        Ok(contents.subscriptions.clone())
    }

    async fn owner(&self, id: &str) -> Result<Option<Owner>, MechfeedError> {
        Ok(self.contents.read().await.owners.get(id).cloned())
    }
}
