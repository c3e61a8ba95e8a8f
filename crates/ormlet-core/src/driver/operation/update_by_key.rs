use super::*;
use crate::{schema::db::{ColumnId, TableId}, stmt};

#[derive(Debug, Clone)]
pub struct UpdateByKey {
    /// Which table to update
    pub table: TableId,

    /// The primary key of the record to update
    pub key: stmt::Value,

    /// Column assignments to apply
    pub assignments: Vec<(ColumnId, stmt::Value)>,
}

impl From<UpdateByKey> for Operation {
    fn from(value: UpdateByKey) -> Self {
        Self::UpdateByKey(value)
    }
}
