//! Daemon registry — task id → daemon record.
//!
//! Backed by a `BTreeMap` so iteration, and therefore the host list, is in
//! ascending task id order.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::types::{DaemonRecord, DaemonState, TaskId};

#[derive(Debug, Default)]
pub struct DaemonRegistry {
    daemons: BTreeMap<TaskId, DaemonRecord>,
}

impl DaemonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly launched daemon.
    pub fn insert(&mut self, record: DaemonRecord) -> StateResult<()> {
        if self.daemons.contains_key(&record.task_id) {
            return Err(StateError::DuplicateTask(record.task_id));
        }
        debug!(task_id = record.task_id, endpoint = %record.endpoint(), "daemon registered");
        self.daemons.insert(record.task_id, record);
        Ok(())
    }

    pub fn get(&self, task_id: TaskId) -> Option<&DaemonRecord> {
        self.daemons.get(&task_id)
    }

    pub fn get_mut(&mut self, task_id: TaskId) -> Option<&mut DaemonRecord> {
        self.daemons.get_mut(&task_id)
    }

    pub fn remove(&mut self, task_id: TaskId) -> Option<DaemonRecord> {
        self.daemons.remove(&task_id)
    }

    pub fn len(&self) -> usize {
        self.daemons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daemons.is_empty()
    }

    /// Records in ascending task id order.
    pub fn iter(&self) -> impl Iterator<Item = &DaemonRecord> {
        self.daemons.values()
    }

    pub fn count_in(&self, state: DaemonState) -> usize {
        self.iter().filter(|d| d.state == state).count()
    }

    /// Daemons launched but not yet running.
    pub fn staged_count(&self) -> usize {
        self.iter().filter(|d| d.state.is_staged()).count()
    }

    /// `host:port` for every running-or-later daemon, by ascending task id.
    pub fn host_list(&self) -> Vec<String> {
        self.iter()
            .filter(|d| d.state.has_started())
            .map(DaemonRecord::endpoint)
            .collect()
    }
}
