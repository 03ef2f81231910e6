//! Bounded, in-memory record of past research runs.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use wikiresearch_shared::{ResearchId, ResearchState};

/// Entries kept before the oldest is evicted.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// One completed query and its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: ResearchId,
    pub query: String,
    pub result: ResearchState,
    pub timestamp: DateTime<Utc>,
}

/// FIFO of the most recent research runs, oldest first.
#[derive(Debug, Clone)]
pub struct ResearchHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for ResearchHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a finished run, evicting the oldest entry when full.
    pub fn push(&mut self, query: impl Into<String>, result: ResearchState) -> &HistoryEntry {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            id: ResearchId::new(),
            query: query.into(),
            result,
            timestamp: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(n).collect()
    }
}
