use ormlet_core::driver::Operation;
use ormlet_core::schema::db::TableId;

use std::sync::{Arc, Mutex};

/// A view over the operations a [`RecordingDriver`] executed.
///
/// [`RecordingDriver`]: crate::RecordingDriver
#[derive(Clone)]
pub struct ExecLog {
    ops: Arc<Mutex<Vec<Operation>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<Operation>>>) -> Self {
        Self { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Forgets everything logged so far. Useful after setup writes.
    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops.lock().unwrap().iter().any(|op| predicate(op))
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(op))
            .count()
    }

    pub fn count_inserts_into(&self, table: TableId) -> usize {
        self.count(|op| matches!(op, Operation::Insert(insert) if insert.table == table))
    }

    pub fn count_updates_of(&self, table: TableId) -> usize {
        self.count(|op| matches!(op, Operation::UpdateByKey(update) if update.table == table))
    }

    pub fn count_deletes_from(&self, table: TableId) -> usize {
        self.count(|op| matches!(op, Operation::DeleteByKey(delete) if delete.table == table))
    }

    /// Runs custom assertions over the raw log.
    pub fn with_ops<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Operation]) -> R,
    {
        f(&self.ops.lock().unwrap())
    }
}
