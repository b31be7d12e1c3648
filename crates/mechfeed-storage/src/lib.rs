// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription storage for mechfeed.
//!
//! [`MemoryStore`] serves owners and subscriptions declared in the
//! configuration file.

pub mod memory;

pub use memory::MemoryStore;
