use crate::plan::PlanExpr;

use ormlet_core::{
    driver::{operation::RowFilter, Row},
    schema::{
        app::{self, Field, FieldId, FieldTy, ModelId},
        db::{ColumnId, TableId},
        mapping,
    },
    stmt::{self, Filter},
    Entity, EntityGraph, EntityRef, Error, FieldValue, NodeId, RelationValue, Result, Schema,
};

/// Translates an entity into the full-width row its insert stores.
///
/// One expression per table column, in column order; columns the model
/// does not map stay null. Validation failures surface here, while the
/// plan is built, so a bad entity never reaches the driver.
pub(crate) fn insert_row(
    schema: &Schema,
    graph: &EntityGraph,
    node: NodeId,
) -> Result<Vec<PlanExpr>> {
    let lowering = Lowering::new(schema, graph, node);
    let assignments = lowering.assignments(true)?;

    let table = schema.table_for(lowering.entity.model);
    let mut row = vec![PlanExpr::null(); table.columns.len()];

    for (column, expr) in assignments {
        row[column.index] = expr;
    }

    if let Some((column, tag)) = &lowering.mapping.discriminator {
        row[column.index] = PlanExpr::Value(tag.clone().into());
    }

    Ok(row)
}

/// Translates an entity into the assignments its update applies.
///
/// Sparse: fields absent from the entity and relations that were never
/// loaded are left untouched. The primary key and the discriminator are
/// never reassigned.
pub(crate) fn update_assignments(
    schema: &Schema,
    graph: &EntityGraph,
    node: NodeId,
) -> Result<Vec<(ColumnId, PlanExpr)>> {
    Lowering::new(schema, graph, node).assignments(false)
}

/// Lowers a model-level filter to column predicates.
///
/// Queries against a sub-model are additionally scoped to rows carrying
/// its discriminator tag.
pub(crate) fn row_filter(schema: &Schema, model: &app::Model, filter: &Filter) -> Result<RowFilter> {
    let mapping = schema.mapping_for(model.id);
    let mut lowered = RowFilter::all();

    for (name, value) in filter.predicates() {
        let Some(field) = model.field_by_name(name) else {
            return Err(Error::validation_unknown_field(&model.name, name));
        };

        let column = match &field.ty {
            FieldTy::Primitive(primitive) => {
                if !value.is_null() {
                    check_primitive(&model.name, field, &primitive.ty, value)?;
                }

                mapping.field(field.id.index).expect_column()
            }
            // Filtering on a to-one relation compares the foreign key
            FieldTy::ManyToOne(_) => fk_predicate_column(schema, model, field, value)?,
            FieldTy::OneToOne(rel) if rel.is_owning() => {
                fk_predicate_column(schema, model, field, value)?
            }
            _ => {
                return Err(Error::validation_type_mismatch(
                    &model.name,
                    &field.name,
                    "column-backed field",
                    "relation without a column",
                ));
            }
        };

        lowered = lowered.eq(column, value.clone());
    }

    if let Some((column, tag)) = tag_filter(schema, model) {
        lowered = lowered.eq(column, tag);
    }

    Ok(lowered)
}

/// The discriminator predicate scoping a query to one sub-model's rows.
///
/// Hierarchy bases query without a tag, so rows of every model sharing
/// the table match and the row's own tag picks the model to materialize.
pub(crate) fn tag_filter(schema: &Schema, model: &app::Model) -> Option<(ColumnId, stmt::Value)> {
    let root = model.as_root()?;
    root.base.as_ref()?;

    let (column, tag) = schema
        .mapping_for(model.id)
        .discriminator
        .as_ref()
        .expect("sub-model has no discriminator");

    Some((*column, tag.clone().into()))
}

/// A filter matching the row with the given primary key.
///
/// Keys are unique across a shared table, so no tag predicate is needed.
pub(crate) fn key_filter(schema: &Schema, model: &app::Model, key: i64) -> RowFilter {
    RowFilter::all().eq(pk_column(schema, model), key)
}

/// The column backing the model's primary key.
pub(crate) fn pk_column(schema: &Schema, model: &app::Model) -> ColumnId {
    let field = model.primary_key_field();

    schema
        .mapping_for(model.id)
        .field(field.id.index)
        .expect_column()
}

/// The column backing a many-to-one or owning one-to-one field.
pub(crate) fn fk_column(schema: &Schema, field: FieldId) -> ColumnId {
    schema
        .mapping_for(field.model)
        .field(field.index)
        .expect_column()
}

/// The model a stored row belongs to.
///
/// For shared tables the row's discriminator tag picks the model. Rows
/// carrying a tag no model claims resolve to `None`.
pub(crate) fn row_model(schema: &Schema, table: TableId, row: &Row) -> Option<ModelId> {
    let mapping = schema.mapping.models_for_table(table).next()?;

    match &mapping.discriminator {
        Some((column, _)) => schema.mapping.model_for_row(table, row.col(*column).as_str()),
        None => schema.mapping.model_for_row(table, None),
    }
}

/// The expression producing a referenced entity's key.
///
/// References to unkeyed graph nodes resolve when the node's insert runs.
pub(crate) fn ref_expr(graph: &EntityGraph, target: EntityRef) -> PlanExpr {
    match target {
        EntityRef::Key(key) => PlanExpr::from(key),
        EntityRef::Node(node) => match graph[node].key() {
            Some(key) => PlanExpr::from(key),
            None => PlanExpr::KeyOf(node),
        },
    }
}

struct Lowering<'a> {
    schema: &'a Schema,
    graph: &'a EntityGraph,
    model: &'a app::Model,
    mapping: &'a mapping::Model,
    entity: &'a Entity,
}

impl<'a> Lowering<'a> {
    fn new(schema: &'a Schema, graph: &'a EntityGraph, node: NodeId) -> Self {
        let entity = &graph[node];

        Self {
            schema,
            graph,
            model: schema.app.model(entity.model),
            mapping: schema.mapping_for(entity.model),
            entity,
        }
    }

    fn assignments(&self, for_insert: bool) -> Result<Vec<(ColumnId, PlanExpr)>> {
        self.check_field_names()?;

        let mut out = vec![];

        for field in &self.model.fields {
            self.lower_field(field, for_insert, &mut out)?;
        }

        Ok(out)
    }

    /// Rejects entity fields the model does not declare, and values whose
    /// shape does not fit the declared field.
    fn check_field_names(&self) -> Result<()> {
        let model = self.model;

        for (name, value) in &self.entity.fields {
            let Some(field) = model.field_by_name(name) else {
                return Err(match value {
                    FieldValue::Relation(_) => {
                        Error::validation_unknown_relation(&model.name, name)
                    }
                    FieldValue::Value(_) => Error::validation_unknown_field(&model.name, name),
                });
            };

            match value {
                FieldValue::Value(value) => {
                    if field.is_relation() {
                        let expected = match &field.ty {
                            FieldTy::ManyToOne(_) | FieldTy::OneToOne(_) => "entity reference",
                            _ => "member collection",
                        };

                        return Err(Error::validation_type_mismatch(
                            &model.name,
                            name,
                            expected,
                            value.type_name(),
                        ));
                    }
                }
                FieldValue::Relation(relation) => match &field.ty {
                    FieldTy::Primitive(primitive) => {
                        return Err(Error::validation_type_mismatch(
                            &model.name,
                            name,
                            primitive.ty.to_string(),
                            "entity reference",
                        ));
                    }
                    FieldTy::Embedded(_) => {
                        return Err(Error::validation_type_mismatch(
                            &model.name,
                            name,
                            "record",
                            "entity reference",
                        ));
                    }
                    FieldTy::ManyToOne(_) | FieldTy::OneToOne(_) => {
                        if matches!(relation, RelationValue::Many(_)) {
                            return Err(Error::validation_type_mismatch(
                                &model.name,
                                name,
                                "to-one reference",
                                "collection",
                            ));
                        }
                    }
                    FieldTy::OneToMany(_) | FieldTy::ManyToMany(_) => {
                        if matches!(relation, RelationValue::One(_)) {
                            return Err(Error::validation_type_mismatch(
                                &model.name,
                                name,
                                "member collection",
                                "to-one reference",
                            ));
                        }
                    }
                },
            }
        }

        Ok(())
    }

    fn lower_field(
        &self,
        field: &Field,
        for_insert: bool,
        out: &mut Vec<(ColumnId, PlanExpr)>,
    ) -> Result<()> {
        let model = self.model;

        match &field.ty {
            FieldTy::Primitive(primitive) => {
                // Keys are assigned by the store and never written by a plan
                if field.primary_key {
                    return Ok(());
                }

                match self.entity.get(&field.name) {
                    Some(stmt::Value::Null) => {
                        if !field.nullable {
                            return Err(Error::validation_null_not_allowed(
                                &model.name,
                                &field.name,
                            ));
                        }

                        out.push((self.column(field), PlanExpr::null()));
                    }
                    Some(value) => {
                        check_primitive(&model.name, field, &primitive.ty, value)?;
                        out.push((self.column(field), PlanExpr::Value(value.clone())));
                    }
                    None if for_insert && !field.nullable && field.auto.is_none() => {
                        return Err(Error::validation_missing_field(&model.name, &field.name));
                    }
                    None => {}
                }
            }
            FieldTy::Embedded(embedded) => {
                let target = self.schema.app.model(embedded.target.expect_id());
                let inner = self
                    .mapping
                    .field(field.id.index)
                    .as_embedded()
                    .expect("embedded field is not mapped as embedded");

                match self.entity.get(&field.name) {
                    Some(stmt::Value::Record(record)) => {
                        self.lower_embedded(&model.name, &field.name, target, record, inner, out)?;
                    }
                    Some(stmt::Value::Null) => {
                        if !field.nullable {
                            return Err(Error::validation_null_not_allowed(
                                &model.name,
                                &field.name,
                            ));
                        }

                        push_nulls(inner, out);
                    }
                    Some(other) => {
                        return Err(Error::validation_type_mismatch(
                            &model.name,
                            &field.name,
                            "record",
                            other.type_name(),
                        ));
                    }
                    None if for_insert && !field.nullable => {
                        return Err(Error::validation_missing_field(&model.name, &field.name));
                    }
                    None => {}
                }
            }
            FieldTy::ManyToOne(_) => self.lower_fk(field, out),
            FieldTy::OneToOne(rel) if rel.is_owning() => self.lower_fk(field, out),
            FieldTy::OneToMany(_) | FieldTy::OneToOne(_) | FieldTy::ManyToMany(_) => {
                // No storage on this table; the planner walks the members.
            }
        }

        Ok(())
    }

    /// Lowers a foreign key column from a to-one relation slot.
    ///
    /// Relations that were never loaded leave the column untouched, so a
    /// partial update cannot sever a link it did not see.
    fn lower_fk(&self, field: &Field, out: &mut Vec<(ColumnId, PlanExpr)>) {
        let column = self.column(field);

        match self.entity.relation(&field.name) {
            None | Some(RelationValue::NotLoaded) => {}
            Some(RelationValue::One(None)) => out.push((column, PlanExpr::null())),
            Some(RelationValue::One(Some(target))) => {
                out.push((column, ref_expr(self.graph, *target)));
            }
            // Rejected by check_field_names
            Some(RelationValue::Many(_)) => {}
        }
    }

    fn lower_embedded(
        &self,
        model_name: &str,
        field_name: &str,
        target: &app::Model,
        record: &stmt::ValueRecord,
        mappings: &[mapping::FieldMapping],
        out: &mut Vec<(ColumnId, PlanExpr)>,
    ) -> Result<()> {
        if record.len() != target.fields.len() {
            return Err(Error::validation_type_mismatch(
                model_name,
                field_name,
                format!("record with {} fields", target.fields.len()),
                format!("record with {} fields", record.len()),
            ));
        }

        for (field, value) in target.fields.iter().zip(record.iter()) {
            let mapping = &mappings[field.id.index];

            match &field.ty {
                FieldTy::Primitive(primitive) => {
                    let column = mapping.expect_column();

                    if value.is_null() {
                        if !field.nullable {
                            return Err(Error::validation_null_not_allowed(
                                &target.name,
                                &field.name,
                            ));
                        }

                        out.push((column, PlanExpr::null()));
                    } else {
                        check_primitive(&target.name, field, &primitive.ty, value)?;
                        out.push((column, PlanExpr::Value(value.clone())));
                    }
                }
                FieldTy::Embedded(embedded) => {
                    let next = self.schema.app.model(embedded.target.expect_id());
                    let inner = mapping
                        .as_embedded()
                        .expect("embedded field is not mapped as embedded");

                    match value {
                        stmt::Value::Record(record) => {
                            self.lower_embedded(
                                &target.name,
                                &field.name,
                                next,
                                record,
                                inner,
                                out,
                            )?;
                        }
                        stmt::Value::Null if field.nullable => push_nulls(inner, out),
                        stmt::Value::Null => {
                            return Err(Error::validation_null_not_allowed(
                                &target.name,
                                &field.name,
                            ));
                        }
                        other => {
                            return Err(Error::validation_type_mismatch(
                                &target.name,
                                &field.name,
                                "record",
                                other.type_name(),
                            ));
                        }
                    }
                }
                _ => unreachable!("embedded models cannot declare relations"),
            }
        }

        Ok(())
    }

    fn column(&self, field: &Field) -> ColumnId {
        self.mapping.field(field.id.index).expect_column()
    }
}

/// Nulls every column an embedded mapping covers.
fn push_nulls(mappings: &[mapping::FieldMapping], out: &mut Vec<(ColumnId, PlanExpr)>) {
    for mapping in mappings {
        match mapping {
            mapping::FieldMapping::Column(column) => out.push((*column, PlanExpr::null())),
            mapping::FieldMapping::Embedded(inner) => push_nulls(inner, out),
            _ => {}
        }
    }
}

fn check_primitive(
    model: &str,
    field: &Field,
    ty: &stmt::Type,
    value: &stmt::Value,
) -> Result<()> {
    if let stmt::Type::Enum(variants) = ty {
        return match value {
            stmt::Value::String(value) if variants.contains(value) => Ok(()),
            stmt::Value::String(value) => Err(Error::validation_invalid_enum_variant(
                model,
                &field.name,
                value.clone(),
            )),
            other => Err(Error::validation_type_mismatch(
                model,
                &field.name,
                ty.to_string(),
                other.type_name(),
            )),
        };
    }

    if value.is_a(ty) {
        Ok(())
    } else {
        Err(Error::validation_type_mismatch(
            model,
            &field.name,
            ty.to_string(),
            value.type_name(),
        ))
    }
}

fn fk_predicate_column(
    schema: &Schema,
    model: &app::Model,
    field: &Field,
    value: &stmt::Value,
) -> Result<ColumnId> {
    if !value.is_null() && value.as_i64().is_none() {
        return Err(Error::validation_type_mismatch(
            &model.name,
            &field.name,
            "key",
            value.type_name(),
        ));
    }

    Ok(fk_column(schema, field.id))
}
