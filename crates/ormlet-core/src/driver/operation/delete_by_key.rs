use super::*;
use crate::{schema::db::TableId, stmt};

#[derive(Debug, Clone)]
pub struct DeleteByKey {
    /// Which table to delete from
    pub table: TableId,

    /// Which keys to delete. Join table keys are two-value records.
    ///
    /// Keys that match no record are skipped, not errors.
    pub keys: Vec<stmt::Value>,
}

impl From<DeleteByKey> for Operation {
    fn from(value: DeleteByKey) -> Self {
        Self::DeleteByKey(value)
    }
}
