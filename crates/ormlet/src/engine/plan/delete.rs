use super::PlanExpr;

use ormlet_core::schema::db::TableId;

/// Deletes one row, identified by primary key.
///
/// For join tables the key is a record holding both halves of the
/// composite key, in column order.
#[derive(Debug)]
pub struct DeleteRow {
    pub table: TableId,

    pub key: PlanExpr,
}
