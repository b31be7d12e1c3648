// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert delivery for mechfeed.
//!
//! [`WebhookNotifier`] posts one embed per matched message to the owner's
//! Discord webhook.

pub mod embed;
pub mod webhook;

pub use embed::WebhookPayload;
pub use webhook::WebhookNotifier;
