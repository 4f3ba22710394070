//! Undo/Redo History
//!
//! A bounded, linear history of complete state snapshots plus a cursor.
//! Recording an edit after undoing discards everything past the cursor;
//! when the history outgrows its cap the oldest snapshots are evicted.
//!
//! There are two ways to change the current state:
//! - [`History::commit_edit`] records a genuine user edit
//! - [`History::apply_snapshot`] only replaces the current state, for state
//!   that arrives as a consequence of undo/redo navigation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MontageError, Result};

/// One recorded state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Human-readable description of the edit that produced this state
    pub label: String,
    /// When the edit was recorded
    pub recorded_at: DateTime<Utc>,
    /// The complete state
    pub state: T,
}

impl<T> Snapshot<T> {
    fn new(label: impl Into<String>, state: T) -> Self {
        Self {
            label: label.into(),
            recorded_at: Utc::now(),
            state,
        }
    }
}

/// Label of the snapshot a history starts from.
pub const INITIAL_LABEL: &str = "Initial state";

/// Linear undo/redo history.
///
/// Invariant: `0 <= index < entries.len() <= max_entries`.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<Snapshot<T>>,
    index: usize,
    max_entries: usize,
    current: T,
}

impl<T: Clone> History<T> {
    /// Start a history seeded with `initial`.
    ///
    /// `max_entries` is raised to 1 if zero.
    pub fn new(initial: T, max_entries: usize) -> Self {
        Self {
            entries: vec![Snapshot::new(INITIAL_LABEL, initial.clone())],
            index: 0,
            max_entries: max_entries.max(1),
            current: initial,
        }
    }

    /// The state the editor currently shows.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Record a new edit.
    ///
    /// Snapshots after the cursor are dropped, `state` is appended and becomes
    /// current. If the history then exceeds its cap, the oldest snapshots are
    /// evicted and the cursor stays on the newest one.
    pub fn commit_edit(&mut self, label: impl Into<String>, state: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(Snapshot::new(label, state.clone()));

        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }

        self.index = self.entries.len() - 1;
        self.current = state;
    }

    /// Replace the current state without recording it.
    pub fn apply_snapshot(&mut self, state: T) {
        self.current = state;
    }

    /// Step back one snapshot. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        self.current = self.entries[self.index].state.clone();
        true
    }

    /// Step forward one snapshot. Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        self.current = self.entries[self.index].state.clone();
        true
    }

    /// Discard all history and start again from `state`.
    pub fn reset(&mut self, state: T) {
        self.entries = vec![Snapshot::new(INITIAL_LABEL, state.clone())];
        self.index = 0;
        self.current = state;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.entries.len() - 1
    }

    /// Label of the edit that `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.index].label.as_str())
    }

    /// Label of the edit that `redo` would re-apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.can_redo()
            .then(|| self.entries[self.index + 1].label.as_str())
    }

    /// Position of the cursor.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its initial snapshot.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Change the cap, evicting snapshots if needed.
    ///
    /// The snapshot under the cursor is always kept: older snapshots go
    /// first, then redo snapshots from the far end.
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
        if self.entries.len() <= self.max_entries {
            return;
        }

        let excess = self.entries.len() - self.max_entries;
        let from_front = excess.min(self.index);
        self.entries.drain(..from_front);
        self.index -= from_front;
        self.entries.truncate(self.max_entries);
    }

    /// All snapshots, oldest first.
    pub fn entries(&self) -> &[Snapshot<T>] {
        &self.entries
    }
}

/// Serializable form of a [`History`].
///
/// `current` is only written when it differs from the snapshot under the
/// cursor, i.e. after [`History::apply_snapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord<T> {
    pub entries: Vec<Snapshot<T>>,
    pub index: usize,
    pub max_entries: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<T>,
}

impl<T: Clone + PartialEq> From<&History<T>> for HistoryRecord<T> {
    fn from(history: &History<T>) -> Self {
        let applied = history
            .entries
            .get(history.index)
            .map_or(true, |snapshot| snapshot.state != history.current);
        Self {
            entries: history.entries.clone(),
            index: history.index,
            max_entries: history.max_entries,
            current: applied.then(|| history.current.clone()),
        }
    }
}

impl<T: Clone> HistoryRecord<T> {
    /// Rebuild the history, checking its invariants.
    pub fn into_history(self) -> Result<History<T>> {
        if self.max_entries == 0 {
            return Err(MontageError::InvalidHistory {
                reason: "max_entries is zero".to_string(),
            });
        }
        if self.entries.len() > self.max_entries {
            return Err(MontageError::InvalidHistory {
                reason: format!(
                    "{} entries exceed the cap of {}",
                    self.entries.len(),
                    self.max_entries
                ),
            });
        }
        let at_cursor = self
            .entries
            .get(self.index)
            .map(|snapshot| snapshot.state.clone())
            .ok_or_else(|| MontageError::InvalidHistory {
                reason: format!(
                    "index {} is outside {} entries",
                    self.index,
                    self.entries.len()
                ),
            })?;
        let current = self.current.unwrap_or(at_cursor);

        Ok(History {
            entries: self.entries,
            index: self.index,
            max_entries: self.max_entries,
            current,
        })
    }
}
