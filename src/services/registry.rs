//! Registry of groups that have issued at least one command.
//!
//! Lives for the process lifetime only; a group re-registers on its next
//! command after a restart.

use std::sync::Arc;

use dashmap::DashSet;

use crate::models::GroupId;

/// Concurrent set of active groups. Cloning shares the same set.
#[derive(Clone, Default)]
pub struct GroupRegistry {
    active: Arc<DashSet<GroupId>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a group active. Returns `true` the first time a group is seen.
    pub fn mark_active(&self, group_id: GroupId) -> bool {
        let inserted = self.active.insert(group_id);
        if inserted {
            tracing::info!(group_id = %group_id, "Group registered for reminders");
        }
        inserted
    }

    /// Owned snapshot of the active groups, sorted by id.
    pub fn list_active(&self) -> Vec<GroupId> {
        let mut groups: Vec<GroupId> = self.active.iter().map(|g| *g).collect();
        groups.sort_unstable();
        groups
    }

    pub fn is_active(&self, group_id: GroupId) -> bool {
        self.active.contains(&group_id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
