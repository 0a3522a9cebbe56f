//! Undo/redo over whole-scene snapshots
//!
//! Each snapshot holds the serialized entity records. The bottom of the undo
//! stack is the baseline, so undo never goes past it.

use std::time::{Duration, Instant, SystemTime};

use shared::parse_entities;
use uuid::Uuid;

use super::store::{EntityStore, PersistenceError};

pub const DEFAULT_CAPACITY: usize = 50;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub id: Uuid,
    pub label: String,
    pub timestamp: SystemTime,
    pub serialized_scene: String,
}

impl HistorySnapshot {
    fn capture(label: &str, store: &EntityStore) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: Uuid::new_v4(),
            label: label.to_string(),
            timestamp: SystemTime::now(),
            serialized_scene: store.serialize_state()?,
        })
    }
}

#[derive(Debug, Clone)]
struct PendingPush {
    label: String,
    deadline: Instant,
}

#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: Vec<HistorySnapshot>,
    redo_stack: Vec<HistorySnapshot>,
    capacity: usize,
    debounce: Duration,
    pending: Option<PendingPush>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_DEBOUNCE)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize, debounce: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
            debounce,
            pending: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Snapshot the store now. Cancels any pending debounced push and
    /// clears the redo stack. A scene that cannot be serialized leaves both
    /// stacks untouched.
    pub fn push(&mut self, label: &str, store: &EntityStore) {
        self.pending = None;
        let snapshot = match HistorySnapshot::capture(label, store) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("history push '{}' dropped: {}", label, e);
                return;
            }
        };
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        tracing::debug!("history push '{}' ({} entries)", label, self.undo_stack.len());
    }

    /// Schedule a push `debounce` after `now`, replacing any pending one
    pub fn push_debounced(&mut self, label: &str, now: Instant) {
        self.pending = Some(PendingPush {
            label: label.to_string(),
            deadline: now + self.debounce,
        });
    }

    /// Fire the pending push if its deadline has passed
    pub fn poll(&mut self, now: Instant, store: &EntityStore) -> bool {
        match &self.pending {
            Some(p) if now >= p.deadline => self.flush(store),
            _ => false,
        }
    }

    /// Fire the pending push immediately
    pub fn flush(&mut self, store: &EntityStore) -> bool {
        match self.pending.take() {
            Some(p) => {
                self.push(&p.label, store);
                true
            }
            None => false,
        }
    }

    pub fn pending_label(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.label.as_str())
    }

    pub fn undo(&mut self, store: &mut EntityStore) -> bool {
        self.flush(store);
        if self.undo_stack.len() <= 1 {
            return false;
        }
        let Some(top) = self.undo_stack.pop() else {
            return false;
        };
        tracing::debug!("undo '{}'", top.label);
        let restored = match self.undo_stack.last() {
            Some(current) => Self::restore(current, store),
            None => false,
        };
        if !restored {
            self.undo_stack.push(top);
            return false;
        }
        self.redo_stack.push(top);
        true
    }

    pub fn redo(&mut self, store: &mut EntityStore) -> bool {
        self.flush(store);
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        tracing::debug!("redo '{}'", next.label);
        if !Self::restore(&next, store) {
            self.redo_stack.push(next);
            return false;
        }
        self.undo_stack.push(next);
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.remove(0);
        }
        true
    }

    /// Rebuild the scene from a snapshot. Everything under the scene root is
    /// removed first, including nodes the store does not own. An unreadable
    /// snapshot leaves the scene as it is and returns `false`.
    pub fn restore(snapshot: &HistorySnapshot, store: &mut EntityStore) -> bool {
        let records = match parse_entities(&snapshot.serialized_scene) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("snapshot '{}' unreadable, scene kept: {}", snapshot.label, e);
                return false;
            }
        };
        store.select_entity(None);
        store.clear_scene();
        let report = store.restore_records(&records);
        if !report.skipped.is_empty() {
            tracing::warn!(
                "restore '{}': skipped {:?}",
                snapshot.label,
                report.skipped
            );
        }
        store.notify_scene_updated();
        true
    }

    /// Drop all history and start over from a single baseline
    pub fn reset(&mut self, label: &str, store: &EntityStore) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
        self.push(label, store);
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1 || self.pending.is_some()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo stack labels, oldest first
    pub fn labels(&self) -> Vec<&str> {
        self.undo_stack.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn latest(&self) -> Option<&HistorySnapshot> {
        self.undo_stack.last()
    }
}
