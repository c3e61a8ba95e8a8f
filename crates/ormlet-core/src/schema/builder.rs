mod table;

use super::{app, db, Mapping, Schema};
use crate::{Error, Result};

use app::{Field, FieldId, FieldRef, FieldTy, Model, ModelId, ModelRef, PrimaryKey};
use indexmap::IndexMap;
use std::sync::Arc;

/// Builds a [`Schema`] from a set of model declarations.
///
/// Building happens once at startup. Every declaration problem is reported
/// as a configuration error here, before any statement reaches a driver.
#[derive(Debug, Default)]
pub struct Builder {
    models: Vec<Model>,
}

/// Used to track state during the build process
struct BuildSchema {
    /// Maps table names to identifiers. The identifiers are reserved before
    /// the table objects are actually created.
    table_lookup: IndexMap<String, db::TableId>,

    /// Tables as they are built
    tables: Vec<db::Table>,

    /// App-level to db-level schema mapping
    mapping: Mapping,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model declaration.
    pub fn register(&mut self, model: Model) -> &mut Self {
        self.models.push(model);
        self
    }

    pub fn build(&mut self) -> Result<Schema> {
        let app = link_models(std::mem::take(&mut self.models))?;

        let mut builder = BuildSchema {
            table_lookup: IndexMap::new(),
            tables: vec![],
            mapping: Mapping {
                models: IndexMap::new(),
            },
        };

        builder.build_entity_tables(&app)?;
        builder.build_join_tables(&app)?;

        Ok(Schema {
            app,
            db: Arc::new(db::Schema {
                tables: builder.tables,
            }),
            mapping: builder.mapping,
        })
    }
}

/// Assigns identifiers, resolves by-name references, and validates the
/// declarations as a whole.
fn link_models(mut models: Vec<Model>) -> Result<app::Schema> {
    for (index, model) in models.iter().enumerate() {
        if models[..index].iter().any(|other| other.name == model.name) {
            return Err(Error::configuration(format!(
                "model {} declared more than once",
                model.name
            )));
        }
    }

    for (index, model) in models.iter_mut().enumerate() {
        model.id = ModelId(index);
    }

    inherit_base_fields(&mut models)?;

    for model in models.iter_mut() {
        let model_id = model.id;
        for (index, field) in model.fields.iter_mut().enumerate() {
            field.id = FieldId {
                model: model_id,
                index,
            };
        }
    }

    resolve_targets(&mut models)?;
    check_embedded_cycles(&models)?;
    validate_models(&mut models)?;
    link_pairs(&mut models)?;
    validate_ownership(&models)?;

    Ok(app::Schema {
        models: models.into_iter().map(|model| (model.id, model)).collect(),
    })
}

/// Copies the base model's fields into each sub-model.
///
/// A sub-model shares its base's table. The base heads the hierarchy: it
/// must declare the discriminator column and cannot itself extend another
/// model.
fn inherit_base_fields(models: &mut [Model]) -> Result<()> {
    let lookup: IndexMap<String, ModelId> = models
        .iter()
        .map(|model| (model.name.clone(), model.id))
        .collect();

    for index in 0..models.len() {
        let Some(base_ref) = models[index]
            .as_root()
            .and_then(|root| root.base.clone())
        else {
            continue;
        };

        let name = models[index].name.clone();

        let base_id = match &base_ref {
            ModelRef::Name(base_name) => match lookup.get(base_name.as_str()) {
                Some(id) => *id,
                None => {
                    return Err(Error::configuration(format!(
                        "model {name} extends unknown model {base_name}"
                    )))
                }
            },
            ModelRef::Id(id) => *id,
        };

        if base_id == models[index].id {
            return Err(Error::configuration(format!(
                "model {name} cannot extend itself"
            )));
        }

        let base = &models[base_id.0];
        let Some(base_root) = base.as_root() else {
            return Err(Error::configuration(format!(
                "model {name} extends embedded model {}",
                base.name
            )));
        };
        if base_root.discriminator.is_none() {
            return Err(Error::configuration(format!(
                "model {} needs a discriminator column to head a single-table hierarchy",
                base.name
            )));
        }
        if base_root.base.is_some() {
            return Err(Error::configuration(format!(
                "single-table hierarchies cannot nest: {} already extends another model",
                base.name
            )));
        }

        let sub_root = models[index].expect_root();
        if sub_root.table_name.is_some() {
            return Err(Error::configuration(format!(
                "model {name} shares {}'s table and cannot name its own",
                models[base_id.0].name
            )));
        }
        if sub_root.discriminator.is_some() {
            return Err(Error::configuration(format!(
                "model {name} shares {}'s discriminator and cannot declare its own",
                models[base_id.0].name
            )));
        }

        if let Some(field) = models[base_id.0].fields.iter().find(|field| field.is_relation()) {
            return Err(Error::configuration(format!(
                "model {} declares relation {} and cannot head a single-table hierarchy",
                models[base_id.0].name, field.name
            )));
        }

        for field in &models[index].fields {
            if models[base_id.0].field_by_name(&field.name).is_some() {
                return Err(Error::configuration(format!(
                    "field {} declared by both {name} and its base {}",
                    field.name, models[base_id.0].name
                )));
            }
        }

        let base_fields = models[base_id.0].fields.clone();
        let sub = &mut models[index];
        sub.expect_root_mut().base = Some(ModelRef::Id(base_id));

        let own = std::mem::take(&mut sub.fields);
        sub.fields = base_fields;
        sub.fields.extend(own);
    }

    Ok(())
}

/// Resolves embedded and relation targets from names to identifiers.
fn resolve_targets(models: &mut [Model]) -> Result<()> {
    let lookup: IndexMap<String, (ModelId, bool)> = models
        .iter()
        .map(|model| (model.name.clone(), (model.id, model.is_embedded())))
        .collect();

    for model in models.iter_mut() {
        let model_name = model.name.clone();

        for field in model.fields.iter_mut() {
            let field_name = field.name.clone();

            let (target, expects_embedded) = match &mut field.ty {
                FieldTy::Primitive(_) => continue,
                FieldTy::Embedded(rel) => (&mut rel.target, true),
                FieldTy::ManyToOne(rel) => (&mut rel.target, false),
                FieldTy::OneToMany(rel) => (&mut rel.target, false),
                FieldTy::OneToOne(rel) => (&mut rel.target, false),
                FieldTy::ManyToMany(rel) => (&mut rel.target, false),
            };

            let ModelRef::Name(target_name) = &*target else {
                continue;
            };

            let Some((id, is_embedded)) = lookup.get(target_name.as_str()).copied() else {
                return Err(Error::configuration(format!(
                    "field {model_name}.{field_name} references unknown model {target_name}"
                )));
            };

            if expects_embedded && !is_embedded {
                return Err(Error::configuration(format!(
                    "field {model_name}.{field_name} embeds {target_name}, which is not an embedded model"
                )));
            }
            if !expects_embedded && is_embedded {
                return Err(Error::configuration(format!(
                    "relation {model_name}.{field_name} targets embedded model {target_name}"
                )));
            }

            *target = ModelRef::Id(id);
        }
    }

    Ok(())
}

/// Rejects embedded models that transitively embed themselves.
fn check_embedded_cycles(models: &[Model]) -> Result<()> {
    fn visit(models: &[Model], id: ModelId, trail: &mut Vec<ModelId>) -> Result<()> {
        if trail.contains(&id) {
            return Err(Error::configuration(format!(
                "embedded model {} embeds itself",
                models[id.0].name
            )));
        }

        trail.push(id);
        for field in &models[id.0].fields {
            if let FieldTy::Embedded(embedded) = &field.ty {
                visit(models, embedded.target.expect_id(), trail)?;
            }
        }
        trail.pop();

        Ok(())
    }

    for model in models {
        visit(models, model.id, &mut vec![])?;
    }

    Ok(())
}

/// Per-model validation: embedded models hold only values, root models have
/// exactly one primary key.
fn validate_models(models: &mut [Model]) -> Result<()> {
    for model in models.iter_mut() {
        if model.is_embedded() {
            for field in &model.fields {
                if field.is_relation() {
                    return Err(Error::configuration(format!(
                        "embedded model {} cannot declare relation {}",
                        model.name, field.name
                    )));
                }
                if field.primary_key {
                    return Err(Error::configuration(format!(
                        "embedded model {} cannot declare a primary key",
                        model.name
                    )));
                }
            }
            continue;
        }

        let mut pk = None;
        for field in &model.fields {
            if !field.primary_key {
                continue;
            }
            if pk.is_some() {
                return Err(Error::configuration(format!(
                    "model {} declares more than one primary key field",
                    model.name
                )));
            }
            if !matches!(&field.ty, FieldTy::Primitive(p) if p.ty.is_i64()) {
                return Err(Error::configuration(format!(
                    "primary key field {}.{} must be a 64-bit integer",
                    model.name, field.name
                )));
            }
            pk = Some(field.id);
        }

        let Some(field) = pk else {
            return Err(Error::configuration(format!(
                "model {} must declare a primary key field",
                model.name
            )));
        };

        model.expect_root_mut().primary_key = Some(PrimaryKey { field });
    }

    Ok(())
}

#[derive(Clone, Copy)]
enum PairKind {
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

/// Resolves declared pair names, backfills the reverse direction, and
/// verifies the pairing is symmetric.
fn link_pairs(models: &mut [Model]) -> Result<()> {
    let mut updates: Vec<(FieldId, FieldId)> = vec![];

    for model in models.iter() {
        for field in &model.fields {
            let (target_id, pair_ref, kind) = match &field.ty {
                FieldTy::ManyToOne(rel) => {
                    (rel.target.expect_id(), rel.pair.as_ref(), PairKind::OneToMany)
                }
                FieldTy::OneToMany(rel) => {
                    (rel.target.expect_id(), Some(&rel.pair), PairKind::ManyToOne)
                }
                FieldTy::OneToOne(rel) => {
                    (rel.target.expect_id(), rel.pair.as_ref(), PairKind::OneToOne)
                }
                FieldTy::ManyToMany(rel) => {
                    (rel.target.expect_id(), rel.pair.as_ref(), PairKind::ManyToMany)
                }
                _ => continue,
            };

            let Some(FieldRef::Name(pair_name)) = pair_ref else {
                continue;
            };

            let target = &models[target_id.0];
            let Some(pair_field) = target.field_by_name(pair_name) else {
                return Err(Error::configuration(format!(
                    "relation {}.{} pairs with unknown field {}.{pair_name}",
                    model.name, field.name, target.name
                )));
            };

            let points_back = match (&pair_field.ty, kind) {
                (FieldTy::OneToMany(rel), PairKind::OneToMany) => {
                    rel.target.expect_id() == model.id
                }
                (FieldTy::ManyToOne(rel), PairKind::ManyToOne) => {
                    rel.target.expect_id() == model.id
                }
                (FieldTy::OneToOne(rel), PairKind::OneToOne) => {
                    rel.target.expect_id() == model.id
                }
                (FieldTy::ManyToMany(rel), PairKind::ManyToMany) => {
                    rel.target.expect_id() == model.id
                }
                _ => false,
            };

            if !points_back {
                return Err(Error::configuration(format!(
                    "relation {}.{} pairs with {}.{pair_name}, which does not point back",
                    model.name, field.name, target.name
                )));
            }

            updates.push((field.id, pair_field.id));
        }
    }

    for (field, pair) in updates {
        set_pair(models, field, pair);
        if pair_of(models, pair).is_none() {
            set_pair(models, pair, field);
        }
    }

    // Symmetry check. Catches two fields claiming the same pair.
    for model_index in 0..models.len() {
        for field_index in 0..models[model_index].fields.len() {
            let field = ModelId(model_index).field(field_index);
            let Some(FieldRef::Id(pair)) = pair_of(models, field) else {
                continue;
            };

            if pair_of(models, pair) != Some(FieldRef::Id(field)) {
                let a = &models[field.model.0];
                let b = &models[pair.model.0];
                return Err(Error::configuration(format!(
                    "relation pairing between {}.{} and {}.{} is not symmetric",
                    a.name, a.fields[field.index].name, b.name, b.fields[pair.index].name
                )));
            }
        }
    }

    Ok(())
}

fn pair_of(models: &[Model], field: FieldId) -> Option<FieldRef> {
    match &models[field.model.0].fields[field.index].ty {
        FieldTy::ManyToOne(rel) => rel.pair.clone(),
        FieldTy::OneToMany(rel) => Some(rel.pair.clone()),
        FieldTy::OneToOne(rel) => rel.pair.clone(),
        FieldTy::ManyToMany(rel) => rel.pair.clone(),
        _ => None,
    }
}

fn set_pair(models: &mut [Model], field: FieldId, pair: FieldId) {
    match &mut models[field.model.0].fields[field.index].ty {
        FieldTy::ManyToOne(rel) => rel.pair = Some(FieldRef::Id(pair)),
        FieldTy::OneToMany(rel) => rel.pair = FieldRef::Id(pair),
        FieldTy::OneToOne(rel) => rel.pair = Some(FieldRef::Id(pair)),
        FieldTy::ManyToMany(rel) => rel.pair = Some(FieldRef::Id(pair)),
        _ => {}
    }
}

/// Validates ownership markers and cascade flags across paired relations.
fn validate_ownership(models: &[Model]) -> Result<()> {
    let full_name = |id: FieldId| {
        let model = &models[id.model.0];
        format!("{}.{}", model.name, model.fields[id.index].name)
    };

    for model in models {
        for field in &model.fields {
            match &field.ty {
                FieldTy::OneToOne(rel) => match rel.pair_id() {
                    None if !rel.join_column => {
                        return Err(Error::configuration(format!(
                            "one-to-one relation {} must declare a join column or pair with the owning side",
                            full_name(field.id)
                        )));
                    }
                    Some(pair) => {
                        let pair_rel =
                            models[pair.model.0].fields[pair.index].ty.expect_one_to_one();
                        if rel.join_column && pair_rel.join_column {
                            return Err(Error::configuration(format!(
                                "both sides of one-to-one relation {} and {} declare a join column",
                                full_name(field.id),
                                full_name(pair)
                            )));
                        }
                        if !rel.join_column && !pair_rel.join_column {
                            return Err(Error::configuration(format!(
                                "neither side of one-to-one relation {} and {} declares a join column",
                                full_name(field.id),
                                full_name(pair)
                            )));
                        }
                    }
                    None => {}
                },
                FieldTy::ManyToMany(rel) => match rel.pair_id() {
                    None if !rel.is_owning() => {
                        return Err(Error::configuration(format!(
                            "many-to-many relation {} must declare a join table or pair with the owning side",
                            full_name(field.id)
                        )));
                    }
                    Some(pair) => {
                        let pair_rel =
                            models[pair.model.0].fields[pair.index].ty.expect_many_to_many();
                        if rel.is_owning() && pair_rel.is_owning() {
                            return Err(Error::configuration(format!(
                                "both sides of many-to-many relation {} and {} declare a join table",
                                full_name(field.id),
                                full_name(pair)
                            )));
                        }
                        if !rel.is_owning() && !pair_rel.is_owning() {
                            return Err(Error::configuration(format!(
                                "neither side of many-to-many relation {} and {} declares a join table",
                                full_name(field.id),
                                full_name(pair)
                            )));
                        }
                    }
                    None => {}
                },
                _ => {}
            }

            // Removing both ends of a paired relation from each other is
            // unsatisfiable; reject it at registration.
            if let (Some(cascade), Some(pair)) = (field.ty.cascade(), pair_id_of(field)) {
                let pair_cascade = models[pair.model.0].fields[pair.index]
                    .ty
                    .cascade()
                    .unwrap_or_default();
                if cascade.remove && pair_cascade.remove && field.id < pair {
                    return Err(Error::configuration(format!(
                        "cascade remove declared on both sides of relation {} and {}",
                        full_name(field.id),
                        full_name(pair)
                    )));
                }
            }
        }
    }

    Ok(())
}

fn pair_id_of(field: &Field) -> Option<FieldId> {
    match &field.ty {
        FieldTy::ManyToOne(rel) => rel.pair_id(),
        FieldTy::OneToMany(rel) => Some(rel.pair_id()),
        FieldTy::OneToOne(rel) => rel.pair_id(),
        FieldTy::ManyToMany(rel) => rel.pair_id(),
        _ => None,
    }
}
