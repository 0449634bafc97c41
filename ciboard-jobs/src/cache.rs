//! Session-scoped decision-task cache.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{DecisionTaskMap, DecisionTaskRef, PushId};

/// Decision tasks already resolved in this session.
///
/// Clones share the same entries. Entries stay until [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct DecisionTaskCache {
    entries: Arc<RwLock<HashMap<PushId, DecisionTaskRef>>>,
}

impl DecisionTaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, push_id: PushId) -> Option<DecisionTaskRef> {
        self.entries.read().get(&push_id).cloned()
    }

    /// Split `push_ids` into cached entries and the ids still to resolve.
    /// Duplicate ids are reported once.
    pub fn partition(&self, push_ids: &[PushId]) -> (DecisionTaskMap, Vec<PushId>) {
        let entries = self.entries.read();
        let mut found = DecisionTaskMap::new();
        let mut missing = Vec::new();

        for &push_id in push_ids {
            match entries.get(&push_id) {
                Some(entry) => {
                    found.insert(push_id, entry.clone());
                }
                None if !missing.contains(&push_id) => missing.push(push_id),
                None => {}
            }
        }

        (found, missing)
    }

    pub fn insert(&self, push_id: PushId, decision_task: DecisionTaskRef) {
        self.entries.write().insert(push_id, decision_task);
    }

    pub fn extend(&self, map: &DecisionTaskMap) {
        let mut entries = self.entries.write();
        for (push_id, decision_task) in map {
            entries.insert(*push_id, decision_task.clone());
        }
    }

    /// Forget every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
