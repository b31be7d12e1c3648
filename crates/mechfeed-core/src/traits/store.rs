// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side contract of the subscription storage collaborator.

use async_trait::async_trait;

use crate::error::MechfeedError;
use crate::types::{Owner, Subscription};

/// Source of subscriptions and their owners.
///
/// The match pipeline takes a fresh snapshot per dispatch pass and never
/// writes back.
#[async_trait]
pub trait SubscriptionStore: Send + Sync + 'static {
    /// Returns every current subscription.
    async fn subscriptions(&self) -> Result<Vec<Subscription>, MechfeedError>;

    /// Resolves an owner id. `Ok(None)` if the owner no longer exists.
    async fn owner(&self, id: &str) -> Result<Option<Owner>, MechfeedError>;
}
