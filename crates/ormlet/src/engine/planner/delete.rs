use super::{join_delete_step, query_rows};
use crate::db::Db;
use crate::engine::lower;
use crate::plan::{DeleteRow, Plan, PlanExpr, UpdateRow, WriteStep};

use ormlet_core::{
    driver::{operation::RowFilter, Row},
    schema::{
        app::{FieldId, FieldTy, ModelId},
        db::TableId,
        mapping::JoinTableMapping,
    },
    EntityGraph, Error, NodeId, Result, Schema,
};

use async_recursion::async_recursion;
use std::collections::HashSet;
use tracing::debug;

/// Builds the plan deleting the entity and, transitively, every related
/// entity reachable over a cascade-remove relation.
///
/// Rows holding a foreign key to a deleted row are deleted first when
/// their relation cascades, and unlinked otherwise. Join table rows
/// referencing a deleted row always go. The row itself goes before the
/// rows its own foreign keys point at.
pub(crate) async fn plan_remove(db: &Db, graph: &EntityGraph, root: NodeId) -> Result<Plan> {
    let entity = &graph[root];
    let model = db.schema.app.model(entity.model);

    let Some(key) = entity.key() else {
        return Err(Error::validation_missing_key(&model.name));
    };

    let mut planner = DeletePlanner {
        db,
        plan: Plan::default(),
        visited: HashSet::new(),
        visited_links: HashSet::new(),
    };

    planner.delete(entity.model, key).await?;

    debug!(steps = planner.plan.len(), "built delete plan");

    Ok(planner.plan)
}

struct DeletePlanner<'a> {
    db: &'a Db,
    plan: Plan,

    /// Rows already planned for deletion
    visited: HashSet<(ModelId, i64)>,

    /// Join rows already planned for deletion, keyed by column order
    visited_links: HashSet<(TableId, i64, i64)>,
}

impl DeletePlanner<'_> {
    #[async_recursion]
    async fn delete(&mut self, model_id: ModelId, key: i64) -> Result<()> {
        if !self.visited.insert((model_id, key)) {
            return Ok(());
        }

        let db = self.db;
        let schema = &db.schema;
        let model = schema.app.model(model_id);
        let table = schema.table_id_for(model_id);

        // The stored row is needed to follow outbound foreign keys. A row
        // already gone deletes to nothing, which is fine.
        let row = query_rows(db, table, lower::key_filter(schema, model, key))
            .await?
            .into_iter()
            .next();

        // Cascade targets this row's own foreign keys point at; deleted
        // after the row so no stored reference is left dangling.
        let mut after: Vec<(ModelId, i64)> = vec![];

        for field in &model.fields {
            match &field.ty {
                FieldTy::ManyToOne(rel) if rel.cascade.remove => {
                    if let Some(target_key) = fk_value(schema, &row, field.id) {
                        after.push((rel.target_id(), target_key));
                    }
                }
                FieldTy::OneToOne(rel) if rel.is_owning() && rel.cascade.remove => {
                    if let Some(target_key) = fk_value(schema, &row, field.id) {
                        after.push((rel.target_id(), target_key));
                    }
                }
                FieldTy::OneToMany(rel) => {
                    self.delete_dependents(key, rel.pair_id(), rel.cascade.remove)
                        .await?;
                }
                FieldTy::OneToOne(rel) if !rel.is_owning() => {
                    let pair = rel.pair_id().expect("inverse one-to-one has no pair");
                    self.delete_dependents(key, pair, rel.cascade.remove).await?;
                }
                FieldTy::ManyToMany(rel) => {
                    let join = *schema
                        .mapping_for(model_id)
                        .field(field.id.index)
                        .expect_join_table();

                    let filter = RowFilter::all().eq(join.source_column, key);

                    for join_row in query_rows(db, join.table, filter).await? {
                        let target_key = join_row.col(join.target_column).expect_i64();
                        self.push_join_delete(&join, key, target_key, &model.name, &field.name);

                        if rel.cascade.remove {
                            self.delete(rel.target_id(), target_key).await?;
                        }
                    }
                }
                _ => {}
            }
        }

        self.plan.push(WriteStep::new(
            DeleteRow {
                table,
                key: PlanExpr::from(key),
            },
            format!("delete {} id={key}", model.name),
        ));

        for (target_model, target_key) in after {
            self.delete(target_model, target_key).await?;
        }

        Ok(())
    }

    /// Plans the rows whose foreign key column points at the deleted row:
    /// deleted when the relation cascades, unlinked otherwise.
    async fn delete_dependents(&mut self, key: i64, pair: FieldId, cascade: bool) -> Result<()> {
        let db = self.db;
        let schema = &db.schema;

        let fk = lower::fk_column(schema, pair);
        let table = schema.table_id_for(pair.model);
        let rows = query_rows(db, table, RowFilter::all().eq(fk, key)).await?;

        for row in rows {
            let Some(member_model) = lower::row_model(schema, table, &row) else {
                continue;
            };

            let member = schema.app.model(member_model);
            let member_key = row.col(lower::pk_column(schema, member)).expect_i64();

            if self.visited.contains(&(member_model, member_key)) {
                continue;
            }

            if cascade {
                self.delete(member_model, member_key).await?;
            } else {
                let pair_name = &schema.app.field(pair).name;

                self.plan.push(WriteStep::new(
                    UpdateRow {
                        table,
                        key: PlanExpr::from(member_key),
                        assignments: vec![(fk, PlanExpr::null())],
                    },
                    format!("unlink {}.{}", member.name, pair_name),
                ));
            }
        }

        Ok(())
    }

    fn push_join_delete(
        &mut self,
        join: &JoinTableMapping,
        source_key: i64,
        target_key: i64,
        model_name: &str,
        field_name: &str,
    ) {
        // Both sides of a relation reach the same physical row; key the
        // dedupe on column order so they collide.
        let mut halves = [0i64; 2];
        halves[join.source_column.index] = source_key;
        halves[join.target_column.index] = target_key;

        if !self.visited_links.insert((join.table, halves[0], halves[1])) {
            return;
        }

        self.plan.push(join_delete_step(
            join,
            source_key,
            target_key,
            format!("unlink {model_name}.{field_name}"),
        ));
    }
}

/// The key stored in a foreign key column, if the row and value exist.
fn fk_value(schema: &Schema, row: &Option<Row>, field: FieldId) -> Option<i64> {
    let row = row.as_ref()?;
    row.col(lower::fk_column(schema, field)).as_i64()
}
