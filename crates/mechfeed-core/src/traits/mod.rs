// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the connectors, the pipeline, and its collaborators.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod connector;
pub mod notifier;
pub mod store;

pub use connector::Connector;
pub use notifier::Notifier;
pub use store::SubscriptionStore;
