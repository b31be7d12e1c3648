// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound side of the match pipeline.

use async_trait::async_trait;

use crate::error::MechfeedError;
use crate::types::{NormalizedMessage, Owner, SourceContext};

/// Delivers a match to one owner.
///
/// Called concurrently, once per matching owner; implementations must not
/// assume any ordering between calls.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(
        &self,
        owner: &Owner,
        context: &SourceContext,
        matched_expression: &str,
        message: &NormalizedMessage,
    ) -> Result<(), MechfeedError>;
}
