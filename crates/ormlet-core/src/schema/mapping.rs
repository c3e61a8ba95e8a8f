mod model;
pub use model::{FieldMapping, JoinTableMapping, Model};

use super::app::ModelId;
use super::db::TableId;

use indexmap::IndexMap;

/// Defines the correspondence between app-level models and database-level
/// tables.
///
/// The mapping is constructed during schema building and remains immutable
/// at runtime. It is the translation layer that turns model-oriented
/// operations into table-oriented operations.
#[derive(Debug, Clone)]
pub struct Mapping {
    /// Per-model mappings indexed by model identifier.
    pub models: IndexMap<ModelId, Model>,
}

impl Mapping {
    /// Returns the mapping for the specified model.
    ///
    /// # Panics
    ///
    /// Panics if the model ID does not exist in the mapping.
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        self.models.get(&id.into()).expect("invalid model ID")
    }

    /// Returns a mutable reference to the mapping for the specified model.
    ///
    /// # Panics
    ///
    /// Panics if the model ID does not exist in the mapping.
    pub fn model_mut(&mut self, id: impl Into<ModelId>) -> &mut Model {
        self.models.get_mut(&id.into()).expect("invalid model ID")
    }

    /// Models stored in the given table.
    pub fn models_for_table(&self, table: TableId) -> impl Iterator<Item = &Model> + '_ {
        self.models.values().filter(move |model| model.table == table)
    }

    /// Resolves the model a row read from `table` belongs to.
    ///
    /// When several models share the table, the row's type tag decides.
    /// Returns `None` for a tag no model claims.
    pub fn model_for_row(&self, table: TableId, tag: Option<&str>) -> Option<ModelId> {
        let mut models = self.models_for_table(table);

        match tag {
            None => models
                .find(|model| model.discriminator.is_none())
                .map(|model| model.id),
            Some(tag) => models
                .find(|model| {
                    model
                        .discriminator
                        .as_ref()
                        .is_some_and(|(_, model_tag)| model_tag == tag)
                })
                .map(|model| model.id),
        }
    }
}
