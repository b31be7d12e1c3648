// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deduplication of overlapping newest-first pages by last-seen id.

/// What to do with a freshly fetched page.
#[derive(Debug, PartialEq, Eq)]
pub enum PollPlan<'a, T> {
    /// Nothing fetched yet: remember the newest id, emit nothing.
    Prime(String),
    /// The newest item is already known (or the page is empty).
    Unchanged,
    /// New items, oldest first. The cursor moves to `newest` once they are
    /// all processed.
    Process { items: Vec<&'a T>, newest: String },
}

/// Remembers the newest item id seen so far.
#[derive(Debug, Clone, Default)]
pub struct PollCursor {
    last_seen: Option<String>,
}

impl PollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Plans a page given newest first. Nothing changes until
    /// [`advance`](Self::advance) is called.
    ///
    /// If the last-seen id is no longer on the page, every item on it is
    /// treated as new.
    pub fn plan<'a, T>(&self, page: &'a [T], id: impl Fn(&T) -> &str) -> PollPlan<'a, T> {
        let Some(newest) = page.first().map(|item| id(item).to_string()) else {
            return PollPlan::Unchanged;
        };

        let Some(last_seen) = self.last_seen.as_deref() else {
            return PollPlan::Prime(newest);
        };

        if newest == last_seen {
            return PollPlan::Unchanged;
        }

        let items = page
            .iter()
            .take_while(|item| id(*item) != last_seen)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        PollPlan::Process { items, newest }
    }

    pub fn advance(&mut self, newest: String) {
        self.last_seen = Some(newest);
    }
}
