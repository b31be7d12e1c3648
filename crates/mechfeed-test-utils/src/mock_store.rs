// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock subscription store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use mechfeed_core::{MechfeedError, Owner, Subscription, SubscriptionStore};

/// In-memory store whose contents tests can change between dispatch passes.
#[derive(Default)]
pub struct MockStore {
    subscriptions: Mutex<Vec<Subscription>>,
    owners: Mutex<HashMap<String, Owner>>,
    failing: AtomicBool,
    snapshots: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an owner with a webhook derived from its id.
    pub async fn add_owner(&self, id: &str, username: &str) {
        self.owners.lock().await.insert(
            id.to_string(),
            Owner {
                id: id.to_string(),
                username: username.to_string(),
                notify_webhook: Some(format!("https://hooks.invalid/{id}")),
            },
        );
    }

    pub async fn add_subscription(&self, subscription: Subscription) {
        self.subscriptions.lock().await.push(subscription);
    }

    /// Makes `subscriptions()` fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of subscription snapshots taken so far.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionStore for MockStore {
    async fn subscriptions(&self) -> Result<Vec<Subscription>, MechfeedError> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MechfeedError::Storage {
                source: "mock store unavailable".into(),
            });
        }
        Ok(self.subscriptions.lock().await.clone())
    }

    async fn owner(&self, id: &str) -> Result<Option<Owner>, MechfeedError> {
        Ok(self.owners.lock().await.get(id).cloned())
    }
}
