use super::{join_delete_step, query_rows};
use crate::db::Db;
use crate::engine::lower;
use crate::plan::{InsertRow, Plan, PlanExpr, UpdateRow, WriteStep};

use ormlet_core::{
    driver::operation::RowFilter,
    schema::{
        app::{Cascade, Field, FieldId, FieldTy, ManyToMany, ModelId},
        mapping::JoinTableMapping,
    },
    Entity, EntityGraph, EntityRef, Error, NodeId, RelationValue, Result,
};

use async_recursion::async_recursion;
use std::collections::HashSet;
use std::mem;
use tracing::debug;

/// Builds the plan persisting every entity reachable from the roots.
///
/// Unkeyed entities insert, keyed ones update. Rows referenced by a
/// foreign key are written before the row holding the key; members of
/// to-many relations are written after their owner. Each entity is
/// written at most once no matter how many paths reach it.
pub(crate) async fn plan_save(db: &Db, graph: &EntityGraph, roots: &[NodeId]) -> Result<Plan> {
    let mut planner = SavePlanner {
        db,
        graph,
        plan: Plan::default(),
        visited: HashSet::new(),
        visited_keys: HashSet::new(),
        in_progress: HashSet::new(),
        deferred: vec![],
    };

    for root in roots {
        planner.visit(*root, None).await?;
    }

    // Foreign keys deferred to break reference cycles are closed once
    // every row exists.
    for (node, field, target) in mem::take(&mut planner.deferred) {
        let row_key = lower::ref_expr(graph, node.into());
        let value = lower::ref_expr(graph, target.into());
        planner.push_link_update(graph[node].model, row_key, field, value);
    }

    debug!(steps = planner.plan.len(), "built save plan");

    Ok(planner.plan)
}

struct SavePlanner<'a> {
    db: &'a Db,
    graph: &'a EntityGraph,
    plan: Plan,

    /// Nodes already planned
    visited: HashSet<NodeId>,

    /// Rows already planned, for graphs holding the same row twice
    visited_keys: HashSet<(ModelId, i64)>,

    /// Nodes whose visit is still on the stack
    in_progress: HashSet<NodeId>,

    /// Foreign keys pointing at an ancestor of the owning row's visit.
    /// Written null at insert and closed with an update at the end.
    deferred: Vec<(NodeId, FieldId, NodeId)>,
}

impl SavePlanner<'_> {
    #[async_recursion]
    async fn visit(&mut self, node: NodeId, link: Option<(FieldId, PlanExpr)>) -> Result<()> {
        let graph = self.graph;
        let entity = &graph[node];

        let first_visit = self.visited.insert(node)
            && entity
                .key()
                .map_or(true, |key| self.visited_keys.insert((entity.model, key)));

        if !first_visit {
            // The row is already planned; at most the link needs fixing
            if let Some((field, expr)) = link {
                self.push_link_update(entity.model, lower::ref_expr(graph, node.into()), field, expr);
            }

            return Ok(());
        }

        self.in_progress.insert(node);

        // Rows this row's foreign keys point at are written first
        let deferred = self.visit_fk_targets(node).await?;

        match entity.key() {
            Some(key) => self.push_update(node, key, link, &deferred)?,
            None => self.push_insert(node, link, &deferred)?,
        }

        for field in deferred {
            let target = fk_target(entity, &self.db.schema.app.field(field).name);
            self.deferred.push((node, field, target));
        }

        // Members pointing back at this row are written after it
        self.visit_dependents(node).await?;

        self.in_progress.remove(&node);

        Ok(())
    }

    /// Visits the targets of this entity's to-one owning relations.
    ///
    /// Returns the fields whose target is an ancestor still being
    /// visited; their columns cannot be filled until the ancestor's
    /// insert has run.
    async fn visit_fk_targets(&mut self, node: NodeId) -> Result<Vec<FieldId>> {
        let db = self.db;
        let graph = self.graph;
        let entity = &graph[node];
        let model = db.schema.app.model(entity.model);

        let mut deferred = vec![];

        for field in &model.fields {
            let cascade = match &field.ty {
                FieldTy::ManyToOne(rel) => rel.cascade,
                FieldTy::OneToOne(rel) if rel.is_owning() => rel.cascade,
                _ => continue,
            };

            let Some(RelationValue::One(Some(EntityRef::Node(target)))) =
                entity.relation(&field.name)
            else {
                continue;
            };
            let target = *target;

            if graph[target].key().is_none() {
                if !cascade.insert {
                    return Err(Error::validation_unsaved_related(&model.name, &field.name));
                }

                if self.in_progress.contains(&target) {
                    deferred.push(field.id);
                    continue;
                }

                self.visit(target, None).await?;
            } else if cascade.update {
                self.visit(target, None).await?;
            }
        }

        Ok(deferred)
    }

    /// Visits relations whose storage lives on the other side.
    async fn visit_dependents(&mut self, node: NodeId) -> Result<()> {
        let db = self.db;
        let graph = self.graph;
        let entity = &graph[node];
        let model = db.schema.app.model(entity.model);

        for field in &model.fields {
            match &field.ty {
                FieldTy::OneToMany(rel) => {
                    let Some(RelationValue::Many(members)) = entity.relation(&field.name) else {
                        continue;
                    };

                    for member in members {
                        self.visit_member(node, model.name.clone(), field, rel.cascade, rel.pair_id(), *member)
                            .await?;
                    }
                }
                FieldTy::OneToOne(rel) if !rel.is_owning() => {
                    let Some(RelationValue::One(Some(target))) = entity.relation(&field.name)
                    else {
                        continue;
                    };

                    let pair = rel.pair_id().expect("inverse one-to-one has no pair");
                    self.visit_member(node, model.name.clone(), field, rel.cascade, pair, *target)
                        .await?;
                }
                FieldTy::ManyToMany(rel) => {
                    let Some(RelationValue::Many(members)) = entity.relation(&field.name) else {
                        continue;
                    };

                    self.visit_m2m(node, model.name.clone(), field, rel, members).await?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Plans one member of a relation whose foreign key lives on the
    /// member's row.
    ///
    /// The link itself is always maintained; the cascade flags only gate
    /// writing the member's own fields.
    async fn visit_member(
        &mut self,
        parent: NodeId,
        parent_model: String,
        field: &Field,
        cascade: Cascade,
        pair: FieldId,
        member: EntityRef,
    ) -> Result<()> {
        let graph = self.graph;
        let parent_expr = lower::ref_expr(graph, parent.into());

        match member {
            EntityRef::Key(key) => {
                // A bare key adopts an existing row into the relation
                self.push_link_update(pair.model, PlanExpr::from(key), pair, parent_expr);
            }
            EntityRef::Node(member_node) => {
                let member_entity = &graph[member_node];
                let keyed = member_entity.key();

                if keyed.is_none() && !cascade.insert {
                    return Err(Error::validation_unsaved_related(parent_model, &field.name));
                }

                let link = self.member_link(parent, member_entity, pair);

                match (keyed, cascade.update) {
                    (None, _) | (_, true) => self.visit(member_node, link).await?,
                    (Some(key), false) => {
                        if let Some((pair, expr)) = link {
                            self.push_link_update(
                                member_entity.model,
                                PlanExpr::from(key),
                                pair,
                                expr,
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Plans a many-to-many relation: member writes gated by cascade,
    /// then the symmetric difference of stored and desired membership
    /// lowered to join row inserts and deletes.
    async fn visit_m2m(
        &mut self,
        node: NodeId,
        model_name: String,
        field: &Field,
        rel: &ManyToMany,
        members: &[EntityRef],
    ) -> Result<()> {
        let db = self.db;
        let graph = self.graph;

        for member in members {
            if let EntityRef::Node(member_node) = member {
                let member_entity = &graph[*member_node];
                let keyed = member_entity.key().is_some();

                if !keyed && !rel.cascade.insert {
                    return Err(Error::validation_unsaved_related(model_name, &field.name));
                }

                if !keyed || rel.cascade.update {
                    self.visit(*member_node, None).await?;
                }
            }
        }

        let entity = &graph[node];
        let join = *db
            .schema
            .mapping_for(entity.model)
            .field(field.id.index)
            .expect_join_table();

        // Desired membership, deduplicated so a member links exactly once
        let mut desired_keys: Vec<i64> = vec![];
        let mut pending: Vec<NodeId> = vec![];

        for member in members {
            match member {
                EntityRef::Key(key) => {
                    if !desired_keys.contains(key) {
                        desired_keys.push(*key);
                    }
                }
                EntityRef::Node(member_node) => match graph[*member_node].key() {
                    Some(key) => {
                        if !desired_keys.contains(&key) {
                            desired_keys.push(key);
                        }
                    }
                    None => {
                        if !pending.contains(member_node) {
                            pending.push(*member_node);
                        }
                    }
                },
            }
        }

        // Stored membership, when the row already exists
        let mut current: Vec<i64> = vec![];

        if let Some(key) = entity.key() {
            let filter = RowFilter::all().eq(join.source_column, key);

            for row in query_rows(db, join.table, filter).await? {
                current.push(row.col(join.target_column).expect_i64());
            }
        }

        let source_expr = lower::ref_expr(graph, node.into());

        for key in &desired_keys {
            if !current.contains(key) {
                self.push_join_insert(
                    &join,
                    source_expr.clone(),
                    PlanExpr::from(*key),
                    format!("link {}.{}", model_name, field.name),
                );
            }
        }

        for member_node in pending {
            self.push_join_insert(
                &join,
                source_expr.clone(),
                PlanExpr::KeyOf(member_node),
                format!("link {}.{}", model_name, field.name),
            );
        }

        for key in current {
            if !desired_keys.contains(&key) {
                let source_key = entity.key().expect("unkeyed row has stored membership");

                self.plan.push(join_delete_step(
                    &join,
                    source_key,
                    key,
                    format!("unlink {}.{}", model_name, field.name),
                ));
            }
        }

        Ok(())
    }

    /// The foreign key assignment a member's row needs to point back at
    /// its parent, or `None` when the member already points there.
    fn member_link(
        &self,
        parent: NodeId,
        member: &Entity,
        pair: FieldId,
    ) -> Option<(FieldId, PlanExpr)> {
        let graph = self.graph;
        let pair_name = &self.db.schema.app.field(pair).name;

        let already = match member.relation(pair_name) {
            Some(RelationValue::One(Some(EntityRef::Node(node)))) => *node == parent,
            Some(RelationValue::One(Some(EntityRef::Key(key)))) => {
                graph[parent].key() == Some(*key)
            }
            _ => false,
        };

        if already {
            None
        } else {
            Some((pair, lower::ref_expr(graph, parent.into())))
        }
    }

    fn push_insert(
        &mut self,
        node: NodeId,
        link: Option<(FieldId, PlanExpr)>,
        deferred: &[FieldId],
    ) -> Result<()> {
        let db = self.db;
        let graph = self.graph;
        let entity = &graph[node];
        let model = db.schema.app.model(entity.model);

        let mut values = lower::insert_row(&db.schema, graph, node)?;

        for field in deferred {
            values[lower::fk_column(&db.schema, *field).index] = PlanExpr::null();
        }

        if let Some((field, expr)) = link {
            values[lower::fk_column(&db.schema, field).index] = expr;
        }

        let step = WriteStep::new(
            InsertRow {
                table: db.schema.table_id_for(entity.model),
                values,
                returning: Some(vec![lower::pk_column(&db.schema, model)]),
            },
            format!("insert {}", model.name),
        )
        .for_node(node);

        self.plan.push(step);

        Ok(())
    }

    fn push_update(
        &mut self,
        node: NodeId,
        key: i64,
        link: Option<(FieldId, PlanExpr)>,
        deferred: &[FieldId],
    ) -> Result<()> {
        let db = self.db;
        let graph = self.graph;
        let entity = &graph[node];
        let model = db.schema.app.model(entity.model);

        let mut assignments = lower::update_assignments(&db.schema, graph, node)?;

        for field in deferred {
            let column = lower::fk_column(&db.schema, *field);
            assignments.retain(|(assigned, _)| *assigned != column);
        }

        if let Some((field, expr)) = link {
            let column = lower::fk_column(&db.schema, field);

            // An explicit value on the member's own field wins
            if !assignments.iter().any(|(assigned, _)| *assigned == column) {
                assignments.push((column, expr));
            }
        }

        if assignments.is_empty() {
            return Ok(());
        }

        let step = WriteStep::new(
            UpdateRow {
                table: db.schema.table_id_for(entity.model),
                key: PlanExpr::from(key),
                assignments,
            },
            format!("update {} id={key}", model.name),
        )
        .for_node(node);

        self.plan.push(step);

        Ok(())
    }

    /// Pushes an update that only sets a foreign key column.
    fn push_link_update(
        &mut self,
        model: ModelId,
        row_key: PlanExpr,
        fk_field: FieldId,
        value: PlanExpr,
    ) {
        let db = self.db;
        let column = lower::fk_column(&db.schema, fk_field);
        let field = db.schema.app.field(fk_field);
        let model_name = &db.schema.app.model(model).name;

        self.plan.push(WriteStep::new(
            UpdateRow {
                table: db.schema.table_id_for(model),
                key: row_key,
                assignments: vec![(column, value)],
            },
            format!("link {}.{}", model_name, field.name),
        ));
    }

    fn push_join_insert(
        &mut self,
        join: &JoinTableMapping,
        source: PlanExpr,
        target: PlanExpr,
        summary: String,
    ) {
        let width = self.db.schema.db.table(join.table).columns.len();
        let mut values = vec![PlanExpr::null(); width];
        values[join.source_column.index] = source;
        values[join.target_column.index] = target;

        self.plan.push(WriteStep::new(
            InsertRow {
                table: join.table,
                values,
                returning: None,
            },
            summary,
        ));
    }
}

/// The node a deferred foreign key field points at.
fn fk_target(entity: &Entity, field_name: &str) -> NodeId {
    match entity.relation(field_name) {
        Some(RelationValue::One(Some(EntityRef::Node(node)))) => *node,
        _ => panic!("deferred foreign key field {field_name} lost its target"),
    }
}
