// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Restart loop around a single connector.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mechfeed_core::{Connector, DispatchSender};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs a connector in its own task and restarts it after `restart_delay`
/// no matter how it ended. Stops only when cancelled.
#[derive(Clone)]
pub struct Supervisor {
    connector: Arc<dyn Connector>,
    restart_delay: Duration,
    restarts: Arc<AtomicU64>,
}

impl Supervisor {
    pub fn new(connector: Arc<dyn Connector>, restart_delay: Duration) -> Self {
        Self {
            connector,
            restart_delay,
            restarts: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn name(&self) -> &str {
        self.connector.name()
    }

    /// Restarts performed so far.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// Spawns [`run`](Self::run) onto the runtime.
    pub fn spawn(&self, queue: DispatchSender, cancel: CancellationToken) -> JoinHandle<()> {
        let supervisor = self.clone();
        tokio::spawn(async move { supervisor.run(queue, cancel).await })
    }

    /// Supervises the connector until `cancel` fires.
    pub async fn run(&self, queue: DispatchSender, cancel: CancellationToken) {
        let name = self.name().to_string();

        loop {
            let connector = self.connector.clone();
            let run_queue = queue.clone();
            let mut task = tokio::spawn(async move { connector.run(run_queue).await });

            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    task.abort();
                    let _ = task.await;
                    break;
                }
                outcome = &mut task => outcome,
            };

            match outcome {
                Ok(Ok(())) => warn!(connector = %name, "connector returned, restarting"),
                Ok(Err(e)) => error!(
                    connector = %name,
                    error = %e,
                    fatal = e.is_fatal(),
                    "connector failed"
                ),
                Err(e) => log_join_error(&name, e),
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.restart_delay) => {}
            }

            let restarts = self.restarts.fetch_add(1, Ordering::Relaxed) + 1;
            info!(connector = %name, restarts, "restarting connector");
        }

        info!(connector = %name, "supervisor stopped");
    }
}

fn log_join_error(name: &str, err: JoinError) {
    if err.is_panic() {
        let message = panic_message(err.into_panic());
        error!(connector = %name, panic = %message, "connector panicked");
    } else {
        warn!(connector = %name, "connector task was cancelled");
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_render() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(42u8)), "non-string panic payload");
    }
}
