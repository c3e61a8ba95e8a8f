use super::PlanExpr;

use ormlet_core::schema::db::{ColumnId, TableId};

/// Inserts one row.
#[derive(Debug)]
pub struct InsertRow {
    /// Table receiving the row
    pub table: TableId,

    /// One expression per table column, in column order
    pub values: Vec<PlanExpr>,

    /// Columns to read back once the row is stored, in the given order.
    /// Used to learn store-assigned keys.
    pub returning: Option<Vec<ColumnId>>,
}
