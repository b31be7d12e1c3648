// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connector that replays a fixed script on every run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use mechfeed_core::{Connector, DispatchSender, MechfeedError, NormalizedMessage};

/// One scripted behaviour.
#[derive(Debug, Clone)]
pub enum Step {
    Emit(NormalizedMessage),
    Sleep(Duration),
    Fail(String),
    Panic(String),
    /// Never completes.
    Pending,
}

/// Runs its steps in order each time `run` is called, then returns `Ok`.
/// With [`looping`](Self::looping) the steps repeat forever.
pub struct ScriptedConnector {
    name: String,
    steps: Vec<Step>,
    looping: bool,
    runs: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            steps,
            looping: false,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// How many times `run` has been entered.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, queue: DispatchSender) -> Result<(), MechfeedError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        loop {
            for step in &self.steps {
                match step {
                    Step::Emit(msg) => queue.push(msg.clone())?,
                    Step::Sleep(duration) => tokio::time::sleep(*duration).await,
                    Step::Fail(reason) => return Err(MechfeedError::Internal(reason.clone())),
                    Step::Panic(reason) => panic!("{reason}"),
                    Step::Pending => std::future::pending::<()>().await,
                }
            }
            if !self.looping {
                return Ok(());
            }
            tokio::task::yield_now().await;
        }
    }
}
