// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The match pipeline.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use mechfeed_core::{
    DispatchReceiver, MechfeedError, NormalizedMessage, Notifier, Source, SourceContext,
    Subscription, SubscriptionStore,
};
use mechfeed_filter::{group_subscriptions, KeywordExpression};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace, warn};

use crate::directory::ChannelDirectory;

/// Compiled expressions keyed by canonical group key. `None` marks keys
/// that never compile.
type ExpressionCache = HashMap<String, Option<Arc<KeywordExpression>>>;

/// Consumes dispatch queues and hands matches to the notifier.
///
/// Notifications run on their own tasks, so a slow webhook never holds up
/// the next message or another owner.
pub struct MatchPipeline {
    store: Arc<dyn SubscriptionStore>,
    notifier: Arc<dyn Notifier>,
    directory: ChannelDirectory,
    feed_name: String,
    expressions: RwLock<ExpressionCache>,
    in_flight: TaskTracker,
}

impl MatchPipeline {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        notifier: Arc<dyn Notifier>,
        directory: ChannelDirectory,
        feed_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            directory,
            feed_name: feed_name.into(),
            expressions: RwLock::new(HashMap::new()),
            in_flight: TaskTracker::new(),
        }
    }

    /// Where a message came from, or `None` if it is not from a monitored
    /// stream channel.
    pub fn context_for(&self, msg: &NormalizedMessage) -> Option<SourceContext> {
        match msg.source() {
            Source::Stream => self.directory.lookup(msg.origin_channel()),
            Source::Feed => Some(SourceContext::Feed {
                name: self.feed_name.clone(),
            }),
        }
    }

    /// One dispatch pass: snapshot subscriptions, evaluate each group once,
    /// and start a notification for every matching owner.
    ///
    /// Returns without waiting for delivery; [`flush`](Self::flush) does
    /// that. The count is the notifications started, ignore lists aside. A
    /// store failure aborts the pass before anything is sent.
    pub async fn dispatch(&self, msg: NormalizedMessage) -> Result<usize, MechfeedError> {
        let Some(context) = self.context_for(&msg) else {
            trace!(channel = msg.origin_channel(), "message from unmonitored channel");
            return Ok(0);
        };

        let subscriptions = self.store.subscriptions().await?;
        let ignored = ignored_authors(&subscriptions);
        let groups = group_subscriptions(&subscriptions);
        let expressions = self.compiled(groups.iter().map(|g| g.expression.as_str()));

        let msg = Arc::new(msg);
        let context = Arc::new(context);
        let mut started = 0usize;

        for group in groups {
            let Some(Some(compiled)) = expressions.get(group.expression.as_str()) else {
                continue;
            };
            if !compiled.matches(msg.content()) {
                continue;
            }

            let expression = Arc::new(group.expression);
            for owner_id in group.owners {
                let ignored = ignored.get(owner_id.as_str()).cloned().unwrap_or_default();
                let store = self.store.clone();
                let notifier = self.notifier.clone();
                let msg = msg.clone();
                let context = context.clone();
                let expression = expression.clone();

                self.in_flight.spawn(async move {
                    notify_owner(store, notifier, owner_id, ignored, &context, &expression, &msg)
                        .await
                });
                started += 1;
            }
        }

        Ok(started)
    }

    /// Waits for every notification started so far to finish.
    pub async fn flush(&self) {
        self.in_flight.close();
        self.in_flight.wait().await;
        self.in_flight.reopen();
    }

    /// Compiled expressions for `keys`, compiling only keys not seen before.
    /// A rebuild drops keys that are no longer subscribed.
    fn compiled<'a>(&self, keys: impl Iterator<Item = &'a str>) -> ExpressionCache {
        let keys: HashSet<&str> = keys.collect();

        let cached = self
            .expressions
            .read()
            .map(|cache| {
                keys.iter()
                    .filter_map(|k| cache.get(*k).map(|e| (k.to_string(), e.clone())))
                    .collect::<ExpressionCache>()
            })
            .unwrap_or_default();
        if cached.len() == keys.len() {
            return cached;
        }

        let current: ExpressionCache = keys
            .iter()
            .map(|k| {
                let expression = cached
                    .get(*k)
                    .cloned()
                    .unwrap_or_else(|| KeywordExpression::compile(k).map(Arc::new));
                (k.to_string(), expression)
            })
            .collect();
        if let Ok(mut cache) = self.expressions.write() {
            *cache = current.clone();
        }
        current
    }

    /// Runs until both queues are closed or `cancel` fires, then drains what
    /// is already queued.
    pub async fn run(
        &self,
        mut stream: DispatchReceiver,
        mut feed: DispatchReceiver,
        cancel: CancellationToken,
    ) {
        let mut stream_open = true;
        let mut feed_open = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                msg = stream.recv(), if stream_open => match msg {
                    Some(msg) => self.process(msg).await,
                    None => stream_open = false,
                },
                msg = feed.recv(), if feed_open => match msg {
                    Some(msg) => self.process(msg).await,
                    None => feed_open = false,
                },
                else => break,
            }
        }

        stream.close();
        feed.close();
        let mut drained = 0usize;
        for queue in [&mut stream, &mut feed] {
            while let Some(msg) = queue.recv().await {
                self.process(msg).await;
                drained += 1;
            }
        }
        self.flush().await;
        info!(drained, "match pipeline stopped");
    }

    async fn process(&self, msg: NormalizedMessage) {
        let id = msg.id().to_string();
        let source = msg.source();
        match self.dispatch(msg).await {
            Ok(0) => {}
            Ok(notified) => debug!(%source, id = %id, notified, "message matched"),
            Err(e) => warn!(%source, id = %id, error = %e, "dispatch pass aborted"),
        }
    }
}

/// Union of ignored authors across each owner's subscriptions.
fn ignored_authors(subscriptions: &[Subscription]) -> HashMap<&str, HashSet<String>> {
    let mut by_owner: HashMap<&str, HashSet<String>> = HashMap::new();
    for sub in subscriptions {
        by_owner
            .entry(sub.owner_id.as_str())
            .or_default()
            .extend(sub.ignored_authors.iter().cloned());
    }
    by_owner
}

async fn notify_owner(
    store: Arc<dyn SubscriptionStore>,
    notifier: Arc<dyn Notifier>,
    owner_id: String,
    ignored: HashSet<String>,
    context: &SourceContext,
    expression: &str,
    msg: &NormalizedMessage,
) {
    let owner = match store.owner(&owner_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            warn!(owner = %owner_id, "subscription owner not found, skipping");
            return;
        }
        Err(e) => {
            warn!(owner = %owner_id, error = %e, "owner lookup failed");
            return;
        }
    };

    if ignored
        .iter()
        .any(|author| author.eq_ignore_ascii_case(msg.author()))
    {
        return;
    }

    if let Err(e) = notifier.notify(&owner, context, expression, msg).await {
        warn!(owner = %owner.id, %context, error = %e, "notification failed");
    }
}
