use super::*;
use crate::{schema::db::{ColumnId, TableId}, stmt};

#[derive(Debug, Clone)]
pub struct Insert {
    /// Which table to insert into
    pub table: TableId,

    /// Rows to insert, each holding one value per table column
    pub rows: Vec<Vec<stmt::Value>>,

    /// Columns to return for each inserted row, in insertion order.
    ///
    /// Used to read back store-assigned keys.
    pub returning: Option<Vec<ColumnId>>,
}

impl From<Insert> for Operation {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
