// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unbounded, ordered hand-off between a connector and the match pipeline.
//!
//! Producers never wait on the consumer. Order is preserved within one queue;
//! nothing is promised across queues.

use tokio::sync::mpsc;

use crate::error::MechfeedError;
use crate::types::{NormalizedMessage, Source};

/// Creates a dispatch queue for one source.
pub fn dispatch_queue(source: Source) -> (DispatchSender, DispatchReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        DispatchSender { source, tx },
        DispatchReceiver { source, rx },
    )
}

/// Producer half, cloned into connector tasks.
#[derive(Debug, Clone)]
pub struct DispatchSender {
    source: Source,
    tx: mpsc::UnboundedSender<NormalizedMessage>,
}

impl DispatchSender {
    pub fn source(&self) -> Source {
        self.source
    }

    /// Enqueues a message. Fails only once the pipeline has shut down.
    pub fn push(&self, msg: NormalizedMessage) -> Result<(), MechfeedError> {
        self.tx.send(msg).map_err(|_| {
            MechfeedError::Internal(format!("{} dispatch queue closed", self.source))
        })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the match pipeline.
#[derive(Debug)]
pub struct DispatchReceiver {
    source: Source,
    rx: mpsc::UnboundedReceiver<NormalizedMessage>,
}

impl DispatchReceiver {
    pub fn source(&self) -> Source {
        self.source
    }

    /// Waits for the next message; `None` once every sender is gone and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<NormalizedMessage> {
        self.rx.recv().await
    }

    /// Takes a queued message without waiting.
    pub fn try_recv(&mut self) -> Option<NormalizedMessage> {
        self.rx.try_recv().ok()
    }

    /// Stops accepting new messages while keeping queued ones readable.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str) -> NormalizedMessage {
        NormalizedMessage::builder(Source::Stream, id).build()
    }

    #[tokio::test]
    async fn preserves_order() {
        let (tx, mut rx) = dispatch_queue(Source::Stream);
        for id in ["1", "2", "3"] {
            tx.push(msg(id)).unwrap();
        }
        drop(tx);

        let mut seen = Vec::new();
        while let Some(m) = rx.recv().await {
            seen.push(m.id().to_string());
        }
        assert_eq!(seen, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn push_fails_after_close() {
        let (tx, mut rx) = dispatch_queue(Source::Feed);
        rx.close();
        assert!(tx.is_closed());
        assert!(tx.push(msg("x")).is_err());
    }
}
