mod delete;
pub(crate) use delete::plan_remove;

mod save;
pub(crate) use save::plan_save;

use crate::db::Db;
use crate::plan::{DeleteRow, PlanExpr, WriteStep};

use ormlet_core::{
    driver::{
        operation::{QueryTable, RowFilter},
        Row,
    },
    schema::{db::TableId, mapping::JoinTableMapping},
    stmt, Result,
};

/// Reads rows while a plan is being built.
///
/// Planning reads run outside the write transaction; the plan acts on
/// the store state observed here, which is what makes concurrent savers
/// last-writer-wins.
pub(super) async fn query_rows(db: &Db, table: TableId, filter: RowFilter) -> Result<Vec<Row>> {
    let response = db
        .driver
        .exec(&db.schema.db, QueryTable { table, filter }.into())
        .await?;

    Ok(response.rows.into_values())
}

/// The step deleting one join table row, identified by both key halves.
fn join_delete_step(
    join: &JoinTableMapping,
    source_key: i64,
    target_key: i64,
    summary: String,
) -> WriteStep {
    let mut pair = vec![stmt::Value::Null; 2];
    pair[join.source_column.index] = source_key.into();
    pair[join.target_column.index] = target_key.into();

    WriteStep::new(
        DeleteRow {
            table: join.table,
            key: PlanExpr::Value(stmt::Value::record_from_vec(pair)),
        },
        summary,
    )
}
