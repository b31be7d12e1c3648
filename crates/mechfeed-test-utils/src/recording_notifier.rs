// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier that records every delivery.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use mechfeed_core::{MechfeedError, NormalizedMessage, Notifier, Owner, SourceContext};

/// One captured `notify` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub owner_id: String,
    pub context: SourceContext,
    pub expression: String,
    pub message_id: String,
}

/// Captures notifications; owners marked failing get an error instead, and
/// owners marked slow are delivered only after their delay.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
    failing_owners: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    notify: Notify,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_for(&self, owner_id: &str) {
        self.failing_owners.lock().await.insert(owner_id.to_string());
    }

    /// Holds every delivery to `owner_id` for `delay`, like a slow webhook.
    pub async fn delay_for(&self, owner_id: &str, delay: Duration) {
        self.delays.lock().await.insert(owner_id.to_string(), delay);
    }

    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().await.clone()
    }

    /// Waits until at least `count` notifications were delivered or
    /// `timeout` elapses, then returns what was delivered.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            {
                let delivered = self.delivered.lock().await;
                if delivered.len() >= count {
                    return delivered.clone();
                }
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.delivered().await;
            }
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        owner: &Owner,
        context: &SourceContext,
        matched_expression: &str,
        message: &NormalizedMessage,
    ) -> Result<(), MechfeedError> {
        let delay = self.delays.lock().await.get(&owner.id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_owners.lock().await.contains(&owner.id) {
            return Err(MechfeedError::Notify {
                message: format!("delivery to {} refused", owner.id),
                source: None,
            });
        }
        self.delivered.lock().await.push(Notification {
            owner_id: owner.id.clone(),
            context: context.clone(),
            expression: matched_expression.to_string(),
            message_id: message.id().to_string(),
        });
        self.notify.notify_waiters();
        Ok(())
    }
}
