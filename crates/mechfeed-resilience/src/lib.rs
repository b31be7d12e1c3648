// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash isolation for connectors.
//!
//! Each connector runs under its own [`Supervisor`], which restarts it after
//! a fixed delay whenever it returns, fails, or panics.

pub mod supervisor;

pub use supervisor::Supervisor;
