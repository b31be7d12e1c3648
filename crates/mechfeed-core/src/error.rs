// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the mechfeed pipeline.

use thiserror::Error;

/// The primary error type used across connectors, collaborators, and the
/// match pipeline.
#[derive(Debug, Error)]
pub enum MechfeedError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Network transport errors (dial, read, write, HTTP request failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A frame or response body could not be decoded.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An HTTP endpoint answered with a non-success status.
    #[error("fetch failed with status {status}: {reason}")]
    Fetch { status: u16, reason: String },

    /// Unrecoverable protocol fault (terminal close code, invalid session,
    /// failed resume). Connectors return this to their supervisor.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// Subscription store errors.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Notification delivery errors.
    #[error("notification error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MechfeedError {
    /// Shorthand for a transport error carrying its cause.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a decode error carrying its cause.
    pub fn decode(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a fatal protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Returns true for faults the connector cannot recover from internally.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::Config(_))
    }
}
