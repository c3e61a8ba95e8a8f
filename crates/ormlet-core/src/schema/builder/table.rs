use super::BuildSchema;
use crate::{
    schema::{
        app::{self, FieldTy, Model},
        db::{Column, ColumnId, Table, TableId},
        mapping::{self, FieldMapping, JoinTableMapping},
    },
    stmt, Error, Result,
};

use heck::ToSnakeCase;

impl BuildSchema {
    /// Creates one table per hierarchy and the per-model column mappings.
    ///
    /// Bases and standalone roots are laid out first so that sub-models can
    /// extend an existing table.
    pub(super) fn build_entity_tables(&mut self, app: &app::Schema) -> Result<()> {
        for model in app.models() {
            let Some(root) = model.as_root() else { continue };
            if root.base.is_some() {
                continue;
            }

            let table_name = root
                .table_name
                .clone()
                .unwrap_or_else(|| model.name.to_snake_case());
            let table_id = self.register_table(table_name)?;

            let fields = self.build_model_columns(app, table_id, model, false)?;

            let mut discriminator = None;
            if let Some(column) = &root.discriminator {
                let column_id = self.append_column(
                    table_id,
                    NewColumn {
                        name: column.clone(),
                        ty: stmt::Type::String,
                        ..NewColumn::default()
                    },
                )?;
                discriminator = Some((column_id, model.name.clone()));
            }

            let pk_field = model.primary_key_field();
            let pk_column = fields[pk_field.id.index].expect_column();
            self.tables[table_id.0].primary_key = vec![pk_column];

            self.mapping.models.insert(
                model.id,
                mapping::Model {
                    id: model.id,
                    table: table_id,
                    fields,
                    discriminator,
                },
            );
        }

        for model in app.models() {
            let Some(root) = model.as_root() else { continue };
            let Some(base) = &root.base else { continue };

            let base_mapping = self.mapping.model(base.expect_id());
            let table_id = base_mapping.table;
            let discriminator_column = base_mapping
                .discriminator
                .as_ref()
                .map(|(column, _)| *column)
                .expect("hierarchy base has no discriminator column");

            let fields = self.build_model_columns(app, table_id, model, true)?;

            self.mapping.models.insert(
                model.id,
                mapping::Model {
                    id: model.id,
                    table: table_id,
                    fields,
                    discriminator: Some((discriminator_column, model.name.clone())),
                },
            );
        }

        Ok(())
    }

    /// Creates join tables for owning many-to-many fields and rewrites both
    /// sides' field mappings to point at them.
    pub(super) fn build_join_tables(&mut self, app: &app::Schema) -> Result<()> {
        for model in app.models() {
            if !model.is_root() {
                continue;
            }

            for field in &model.fields {
                let FieldTy::ManyToMany(rel) = &field.ty else {
                    continue;
                };
                let Some(join_table) = &rel.join_table else {
                    continue;
                };

                let source_table = self.mapping.model(model.id).table;
                let target_table = self.mapping.model(rel.target_id()).table;
                let source_name = self.tables[source_table.0].name.clone();
                let target_name = self.tables[target_table.0].name.clone();

                let name = join_table.name.clone().unwrap_or_else(|| {
                    format!("{source_name}_{}_{target_name}", field.name)
                });
                let source_column_name = join_table
                    .source_column
                    .clone()
                    .unwrap_or_else(|| format!("{source_name}_id"));
                let target_column_name = join_table
                    .target_column
                    .clone()
                    .unwrap_or_else(|| format!("{target_name}_id"));

                if source_column_name == target_column_name {
                    return Err(Error::configuration(format!(
                        "join table {name} for relation {}.{} needs explicit key column names",
                        model.name, field.name
                    )));
                }

                let table_id = self.register_table(name)?;
                let source_column = self.append_column(
                    table_id,
                    NewColumn::key_part(source_column_name),
                )?;
                let target_column = self.append_column(
                    table_id,
                    NewColumn::key_part(target_column_name),
                )?;
                self.tables[table_id.0].primary_key = vec![source_column, target_column];

                self.mapping.model_mut(model.id).fields[field.id.index] =
                    FieldMapping::JoinTable(JoinTableMapping {
                        table: table_id,
                        source_column,
                        target_column,
                    });

                if let Some(pair) = rel.pair_id() {
                    self.mapping.model_mut(pair.model).fields[pair.index] =
                        FieldMapping::JoinTable(JoinTableMapping {
                            table: table_id,
                            source_column: target_column,
                            target_column: source_column,
                        });
                }
            }
        }

        Ok(())
    }

    /// Builds the column mapping for one model's fields.
    ///
    /// With `shared` set the table already holds another model's columns:
    /// matching columns are reused and new ones are forced nullable, since
    /// sibling rows have no value for them.
    fn build_model_columns(
        &mut self,
        app: &app::Schema,
        table_id: TableId,
        model: &Model,
        shared: bool,
    ) -> Result<Vec<FieldMapping>> {
        let mut fields = Vec::with_capacity(model.fields.len());

        for field in &model.fields {
            let mapping = match &field.ty {
                FieldTy::Primitive(primitive) => FieldMapping::Column(self.model_column(
                    table_id,
                    NewColumn {
                        name: field.column_name().to_string(),
                        ty: primitive.ty.clone(),
                        nullable: field.nullable,
                        unique: field.unique,
                        primary_key: field.primary_key,
                        auto_increment: field.is_auto_increment(),
                    },
                    shared,
                )?),
                FieldTy::Embedded(embedded) => FieldMapping::Embedded(self.flatten_embedded(
                    app,
                    table_id,
                    field.column_name(),
                    app.model(embedded.target.expect_id()),
                    field.nullable,
                    shared,
                )?),
                // Entities may be saved before the related entity is linked,
                // so foreign key columns always accept null.
                FieldTy::ManyToOne(_) => FieldMapping::Column(self.model_column(
                    table_id,
                    NewColumn {
                        name: field.fk_column_name(),
                        ty: stmt::Type::I64,
                        nullable: true,
                        ..NewColumn::default()
                    },
                    shared,
                )?),
                FieldTy::OneToOne(rel) if rel.is_owning() => {
                    FieldMapping::Column(self.model_column(
                        table_id,
                        NewColumn {
                            name: field.fk_column_name(),
                            ty: stmt::Type::I64,
                            nullable: true,
                            unique: true,
                            ..NewColumn::default()
                        },
                        shared,
                    )?)
                }
                FieldTy::OneToOne(_) | FieldTy::OneToMany(_) => FieldMapping::None,
                // Rewritten by the join table pass.
                FieldTy::ManyToMany(_) => FieldMapping::None,
            };

            fields.push(mapping);
        }

        Ok(fields)
    }

    /// Flattens an embedded model into prefixed columns, one mapping per
    /// inner field.
    fn flatten_embedded(
        &mut self,
        app: &app::Schema,
        table_id: TableId,
        prefix: &str,
        target: &Model,
        nullable: bool,
        shared: bool,
    ) -> Result<Vec<FieldMapping>> {
        let mut fields = Vec::with_capacity(target.fields.len());

        for inner in &target.fields {
            let name = format!("{prefix}_{}", inner.column_name());

            let mapping = match &inner.ty {
                FieldTy::Primitive(primitive) => FieldMapping::Column(self.model_column(
                    table_id,
                    NewColumn {
                        name,
                        ty: primitive.ty.clone(),
                        nullable: nullable || inner.nullable,
                        unique: inner.unique,
                        ..NewColumn::default()
                    },
                    shared,
                )?),
                FieldTy::Embedded(embedded) => FieldMapping::Embedded(self.flatten_embedded(
                    app,
                    table_id,
                    &name,
                    app.model(embedded.target.expect_id()),
                    nullable || inner.nullable,
                    shared,
                )?),
                _ => unreachable!("embedded models cannot declare relations"),
            };

            fields.push(mapping);
        }

        Ok(fields)
    }

    fn model_column(
        &mut self,
        table_id: TableId,
        column: NewColumn,
        shared: bool,
    ) -> Result<ColumnId> {
        if shared {
            if let Some(existing) = self.tables[table_id.0].column_by_name(&column.name) {
                if existing.ty != column.ty {
                    return Err(Error::configuration(format!(
                        "column {} in table {} is declared with conflicting types",
                        column.name, self.tables[table_id.0].name
                    )));
                }
                return Ok(existing.id);
            }

            // Columns added by one sub-model are absent from sibling rows.
            return self.append_column(
                table_id,
                NewColumn {
                    nullable: true,
                    ..column
                },
            );
        }

        self.append_column(table_id, column)
    }

    fn append_column(&mut self, table_id: TableId, column: NewColumn) -> Result<ColumnId> {
        let table = &mut self.tables[table_id.0];

        if table.column_by_name(&column.name).is_some() {
            return Err(Error::configuration(format!(
                "column {} in table {} maps to multiple fields",
                column.name, table.name
            )));
        }

        let id = ColumnId {
            table: table_id,
            index: table.columns.len(),
        };
        table.columns.push(Column {
            id,
            name: column.name,
            ty: column.ty,
            nullable: column.nullable,
            unique: column.unique,
            primary_key: column.primary_key,
            auto_increment: column.auto_increment,
        });

        Ok(id)
    }

    fn register_table(&mut self, name: String) -> Result<TableId> {
        if self.table_lookup.contains_key(&name) {
            return Err(Error::configuration(format!(
                "table {name} is declared more than once"
            )));
        }

        let id = TableId(self.tables.len());
        self.table_lookup.insert(name.clone(), id);
        self.tables.push(Table::new(id, name));
        Ok(id)
    }
}

struct NewColumn {
    name: String,
    ty: stmt::Type,
    nullable: bool,
    unique: bool,
    primary_key: bool,
    auto_increment: bool,
}

impl NewColumn {
    fn key_part(name: String) -> Self {
        Self {
            name,
            primary_key: true,
            ..Self::default()
        }
    }
}

impl Default for NewColumn {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: stmt::Type::I64,
            nullable: false,
            unique: false,
            primary_key: false,
            auto_increment: false,
        }
    }
}
