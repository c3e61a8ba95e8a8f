mod store;
use store::Store;

use ormlet_core::{
    async_trait,
    driver::{Driver, Operation, Response},
    schema::db::Schema,
    Result,
};

use std::sync::{Arc, Mutex, PoisonError};

/// An in-memory driver backed by ordered tables.
///
/// Data lives for the lifetime of the process. Every operation runs under a
/// single store-wide lock, and the transaction ops snapshot the full store,
/// so one `Mem` instance supports one transaction at a time.
#[derive(Debug, Default)]
pub struct Mem {
    store: Mutex<Store>,
}

impl Mem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        // A poisoned lock means a panic mid-operation. The store itself is
        // still structurally valid, and the snapshot covers partial writes.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Driver for Mem {
    async fn register_schema(&mut self, schema: &Schema) -> Result<()> {
        self.lock().register(schema);
        Ok(())
    }

    async fn exec(&self, schema: &Arc<Schema>, op: Operation) -> Result<Response> {
        let mut store = self.lock();

        match op {
            Operation::Insert(op) => store.insert(schema, op),
            Operation::DeleteByKey(op) => store.delete_by_key(schema, op),
            Operation::QueryTable(op) => store.query_table(op),
            Operation::Transaction(op) => store.transaction(op),
            Operation::UpdateByKey(op) => store.update_by_key(schema, op),
        }
    }
}
