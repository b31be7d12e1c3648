// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the mechfeed ingestion pipeline.
//!
//! Holds the error type, the normalized message model, the dispatch queue,
//! and the trait seams every connector and collaborator implements.

pub mod error;
pub mod queue;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MechfeedError;
pub use queue::{dispatch_queue, DispatchReceiver, DispatchSender};
pub use traits::{Connector, Notifier, SubscriptionStore};
pub use types::{NormalizedMessage, Owner, Source, SourceContext, Subscription};
