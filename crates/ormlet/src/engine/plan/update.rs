use super::PlanExpr;

use ormlet_core::schema::db::{ColumnId, TableId};

/// Updates columns of one row, identified by primary key.
#[derive(Debug)]
pub struct UpdateRow {
    pub table: TableId,

    /// Primary key of the row to update
    pub key: PlanExpr,

    /// Column assignments to apply
    pub assignments: Vec<(ColumnId, PlanExpr)>,
}
