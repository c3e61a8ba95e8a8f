//! Application-level schema

mod auto;
pub use auto::Auto;

mod cascade;
pub use cascade::Cascade;

mod embedded;
pub use embedded::Embedded;

mod field;
pub use field::{Field, FieldId, FieldPrimitive, FieldTy};

mod model;
pub use model::{Model, ModelId, ModelKind, ModelRoot};

mod pk;
pub use pk::PrimaryKey;

mod reference;
pub use reference::{FieldRef, ModelRef};

mod relation;
pub use relation::{JoinTable, ManyToMany, ManyToOne, OneToMany, OneToOne};

use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct Schema {
    pub models: IndexMap<ModelId, Model>,
}

impl Schema {
    /// Get a model by ID
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        self.models.get(&id.into()).expect("invalid model ID")
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.models.values().find(|model| model.name == name)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Get a field by ID
    pub fn field(&self, id: FieldId) -> &Field {
        self.model(id.model)
            .fields
            .get(id.index)
            .expect("invalid field ID")
    }
}
