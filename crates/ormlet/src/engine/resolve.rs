use super::planner::query_rows;
use crate::db::Db;
use crate::engine::lower;

use ormlet_core::{
    driver::{operation::RowFilter, Row},
    schema::{
        app::{FieldTy, Model, ModelId},
        mapping,
    },
    stmt::{self, Filter},
    Entity, EntityGraph, EntityRef, Error, FieldValue, NodeId, RelationValue, Result, Schema,
};

use indexmap::IndexMap;
use tracing::debug;

/// Loads the first entity matching the filter into a fresh graph.
///
/// Relations named in `relations` are resolved and their targets
/// materialized as graph nodes; every other relation is marked not
/// loaded, except to-one foreign keys which always surface as key
/// references. Queries against a hierarchy base match rows of every
/// model in the hierarchy and materialize each under its own model.
pub(crate) async fn find_one(
    db: &Db,
    model_id: ModelId,
    filter: Filter,
    relations: &[&str],
) -> Result<Option<(EntityGraph, NodeId)>> {
    let schema = &db.schema;
    let model = schema.app.model(model_id);

    // Unknown relation names fail before any query runs
    for name in relations {
        let known = model
            .field_by_name(name)
            .is_some_and(|field| field.is_relation());

        if !known {
            return Err(Error::validation_unknown_relation(&model.name, *name));
        }
    }

    let table = schema.table_id_for(model_id);
    let row_filter = lower::row_filter(schema, model, &filter)?;

    debug!(model = %model.name, %filter, "resolving find_one");

    let Some(row) = query_rows(db, table, row_filter).await?.into_iter().next() else {
        return Ok(None);
    };

    let actual = lower::row_model(schema, table, &row).unwrap_or(model_id);

    let mut graph = EntityGraph::new();
    let node = materialize(schema, &mut graph, actual, &row);

    for name in relations {
        load_relation(db, &mut graph, node, name).await?;
    }

    Ok(Some((graph, node)))
}

/// Turns a stored row into a graph node.
fn materialize(schema: &Schema, graph: &mut EntityGraph, model_id: ModelId, row: &Row) -> NodeId {
    let model = schema.app.model(model_id);
    let mapping = schema.mapping_for(model_id);
    let mut entity = Entity::new(model_id);

    for field in &model.fields {
        match &field.ty {
            FieldTy::Primitive(_) => {
                let column = mapping.field(field.id.index).expect_column();
                entity.set(field.name.clone(), row.col(column).clone());
            }
            FieldTy::Embedded(embedded) => {
                let target = schema.app.model(embedded.target.expect_id());
                let inner = mapping
                    .field(field.id.index)
                    .as_embedded()
                    .expect("embedded field is not mapped as embedded");

                entity.set(
                    field.name.clone(),
                    embedded_value(schema, field.nullable, target, inner, row),
                );
            }
            // Owning to-one sides carry their foreign key in the row, so
            // the reference is known without loading the target
            FieldTy::ManyToOne(_) => {
                set_key_ref(&mut entity, field.name.clone(), row, mapping.field(field.id.index));
            }
            FieldTy::OneToOne(rel) if rel.is_owning() => {
                set_key_ref(&mut entity, field.name.clone(), row, mapping.field(field.id.index));
            }
            FieldTy::OneToMany(_) | FieldTy::OneToOne(_) | FieldTy::ManyToMany(_) => {
                entity
                    .fields
                    .insert(field.name.clone(), FieldValue::Relation(RelationValue::NotLoaded));
            }
        }
    }

    graph.add(entity)
}

fn set_key_ref(
    entity: &mut Entity,
    field: String,
    row: &Row,
    mapping: &mapping::FieldMapping,
) {
    let relation = match row.col(mapping.expect_column()).as_i64() {
        Some(key) => RelationValue::One(Some(EntityRef::Key(key))),
        None => RelationValue::One(None),
    };

    entity.fields.insert(field, FieldValue::Relation(relation));
}

/// Reconstructs an embedded value from its flattened columns.
///
/// A nullable embedded field whose columns are all null reads back as
/// null rather than a record of nulls.
fn embedded_value(
    schema: &Schema,
    nullable: bool,
    target: &Model,
    mappings: &[mapping::FieldMapping],
    row: &Row,
) -> stmt::Value {
    let mut values = vec![];

    for field in &target.fields {
        let mapping = &mappings[field.id.index];

        match &field.ty {
            FieldTy::Primitive(_) => values.push(row.col(mapping.expect_column()).clone()),
            FieldTy::Embedded(embedded) => {
                let next = schema.app.model(embedded.target.expect_id());
                let inner = mapping
                    .as_embedded()
                    .expect("embedded field is not mapped as embedded");

                values.push(embedded_value(schema, field.nullable, next, inner, row));
            }
            _ => unreachable!("embedded models cannot declare relations"),
        }
    }

    if nullable && values.iter().all(stmt::Value::is_null) {
        stmt::Value::Null
    } else {
        stmt::Value::record_from_vec(values)
    }
}

async fn load_relation(
    db: &Db,
    graph: &mut EntityGraph,
    node: NodeId,
    name: &str,
) -> Result<()> {
    let schema = &db.schema;
    let model_id = graph[node].model;
    let model = schema.app.model(model_id);

    let Some(field) = model.field_by_name(name) else {
        return Err(Error::validation_unknown_relation(&model.name, name));
    };

    match &field.ty {
        FieldTy::ManyToOne(rel) => {
            load_one_by_fk(db, graph, node, &field.name, rel.target_id()).await
        }
        FieldTy::OneToOne(rel) if rel.is_owning() => {
            load_one_by_fk(db, graph, node, &field.name, rel.target_id()).await
        }
        FieldTy::OneToOne(rel) => {
            let pair = rel.pair_id().expect("inverse one-to-one has no pair");
            let Some(key) = graph[node].key() else {
                return Ok(());
            };

            let fk = lower::fk_column(schema, pair);
            let table = schema.table_id_for(rel.target_id());
            let rows = query_rows(db, table, RowFilter::all().eq(fk, key)).await?;

            if rows.len() > 1 {
                return Err(Error::too_many_records(format!(
                    "{}.{} resolved {} rows",
                    model.name,
                    field.name,
                    rows.len()
                )));
            }

            match rows.into_iter().next() {
                Some(row) => {
                    let actual = lower::row_model(schema, table, &row).unwrap_or(rel.target_id());
                    let target = materialize(schema, graph, actual, &row);
                    graph.set_one(node, field.name.clone(), target);
                }
                None => graph[node].clear_one(field.name.clone()),
            }

            Ok(())
        }
        FieldTy::OneToMany(rel) => {
            let Some(key) = graph[node].key() else {
                return Ok(());
            };

            let fk = lower::fk_column(schema, rel.pair_id());
            let table = schema.table_id_for(rel.target_id());
            let rows = query_rows(db, table, RowFilter::all().eq(fk, key)).await?;

            let mut members = vec![];

            for row in rows {
                let actual = lower::row_model(schema, table, &row).unwrap_or(rel.target_id());
                members.push(materialize(schema, graph, actual, &row));
            }

            graph.set_many(node, field.name.clone(), &members);
            Ok(())
        }
        FieldTy::ManyToMany(_) => load_many_to_many(db, graph, node, field.id.index, name).await,
        _ => Err(Error::validation_unknown_relation(&model.name, name)),
    }
}

/// Loads the target of a relation whose foreign key sits on this row.
async fn load_one_by_fk(
    db: &Db,
    graph: &mut EntityGraph,
    node: NodeId,
    field: &str,
    target_model: ModelId,
) -> Result<()> {
    let schema = &db.schema;

    let key = match graph[node].relation(field) {
        Some(RelationValue::One(Some(EntityRef::Key(key)))) => *key,
        _ => return Ok(()),
    };

    let table = schema.table_id_for(target_model);
    let target = schema.app.model(target_model);
    let rows = query_rows(db, table, lower::key_filter(schema, target, key)).await?;

    match rows.into_iter().next() {
        Some(row) => {
            let actual = lower::row_model(schema, table, &row).unwrap_or(target_model);
            let target_node = materialize(schema, graph, actual, &row);
            graph.set_one(node, field.to_string(), target_node);
        }
        // The referenced row is gone; surface the absence, not the key
        None => graph[node].clear_one(field.to_string()),
    }

    Ok(())
}

/// Loads many-to-many members: one join table read, then one batched
/// fetch of the member rows.
async fn load_many_to_many(
    db: &Db,
    graph: &mut EntityGraph,
    node: NodeId,
    field_index: usize,
    name: &str,
) -> Result<()> {
    let schema = &db.schema;
    let model_id = graph[node].model;

    let Some(key) = graph[node].key() else {
        return Ok(());
    };

    let join = *schema
        .mapping_for(model_id)
        .field(field_index)
        .expect_join_table();

    let join_rows = query_rows(db, join.table, RowFilter::all().eq(join.source_column, key)).await?;

    let keys: Vec<i64> = join_rows
        .iter()
        .map(|row| row.col(join.target_column).expect_i64())
        .collect();

    if keys.is_empty() {
        graph.set_many(node, name.to_string(), &[]);
        return Ok(());
    }

    let rel = schema.app.model(model_id).fields[field_index]
        .ty
        .expect_many_to_many();
    let target_model = rel.target_id();
    let table = schema.table_id_for(target_model);
    let pk = lower::pk_column(schema, schema.app.model(target_model));

    let filter = RowFilter::all().in_set(pk, keys.iter().map(|key| (*key).into()).collect());
    let rows = query_rows(db, table, filter).await?;

    let mut by_key: IndexMap<i64, NodeId> = IndexMap::new();

    for row in rows {
        let actual = lower::row_model(schema, table, &row).unwrap_or(target_model);
        let member_key = row.col(pk).expect_i64();
        by_key.insert(member_key, materialize(schema, graph, actual, &row));
    }

    // Membership order follows the join rows
    let members: Vec<NodeId> = keys.iter().filter_map(|key| by_key.get(key).copied()).collect();

    graph.set_many(node, name.to_string(), &members);

    Ok(())
}
