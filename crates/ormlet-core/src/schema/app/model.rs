use super::{Field, FieldId, ModelRef, PrimaryKey};

use std::fmt;

/// A model declaration.
///
/// Models are declared up front, registered with the schema builder, and
/// never mutated afterwards. Relation targets are declared by model name
/// and resolved to identifiers when the schema is built.
#[derive(Debug, Clone)]
pub struct Model {
    /// Uniquely identifies the model within the schema
    pub id: ModelId,

    /// Name of the model
    pub name: String,

    /// Fields contained by the model
    pub fields: Vec<Field>,

    /// Distinguishes root models (with tables and primary keys) from
    /// embedded models
    pub kind: ModelKind,
}

#[derive(Debug, Clone)]
pub enum ModelKind {
    /// Root model that maps to a database table and can be queried directly
    Root(ModelRoot),

    /// Embedded model that is flattened into its parent model's table
    Embedded,
}

#[derive(Debug, Clone)]
pub struct ModelRoot {
    /// The primary key for this model. Set when the schema is built.
    pub primary_key: Option<PrimaryKey>,

    /// If the declaration specifies a table to map the model to, this is set.
    pub table_name: Option<String>,

    /// Name of the type-tag column when this model heads a single-table
    /// hierarchy.
    pub discriminator: Option<String>,

    /// The hierarchy base when this model shares another model's table.
    pub base: Option<ModelRef>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

impl Model {
    /// Declares a root model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ModelId::placeholder(),
            name: name.into(),
            fields: vec![],
            kind: ModelKind::Root(ModelRoot {
                primary_key: None,
                table_name: None,
                discriminator: None,
                base: None,
            }),
        }
    }

    /// Declares an embedded model.
    ///
    /// Embedded models have no table or primary key. Their fields are
    /// flattened into each model that embeds them.
    pub fn embedded(name: impl Into<String>) -> Self {
        Self {
            id: ModelId::placeholder(),
            name: name.into(),
            fields: vec![],
            kind: ModelKind::Embedded,
        }
    }

    /// Declares a model stored in its base model's table.
    ///
    /// The base must declare a discriminator column. The sub-model inherits
    /// all of the base's fields and may declare additional ones. Rows are
    /// tagged with the sub-model's name.
    pub fn sub_of(name: impl Into<String>, base: impl Into<ModelRef>) -> Self {
        Self {
            id: ModelId::placeholder(),
            name: name.into(),
            fields: vec![],
            kind: ModelKind::Root(ModelRoot {
                primary_key: None,
                table_name: None,
                discriminator: None,
                base: Some(base.into()),
            }),
        }
    }

    /// Maps the model to an explicitly named table.
    #[track_caller]
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.expect_root_mut().table_name = Some(name.into());
        self
    }

    /// Declares the discriminator column for a single-table hierarchy.
    #[track_caller]
    pub fn discriminator(mut self, column: impl Into<String>) -> Self {
        self.expect_root_mut().discriminator = Some(column.into());
        self
    }

    /// Adds a field to the model.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns true if this is a root model (has a table and primary key)
    pub fn is_root(&self) -> bool {
        matches!(self.kind, ModelKind::Root(_))
    }

    /// Returns true if this is an embedded model (flattened into parent)
    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, ModelKind::Embedded)
    }

    pub fn as_root(&self) -> Option<&ModelRoot> {
        match &self.kind {
            ModelKind::Root(root) => Some(root),
            ModelKind::Embedded => None,
        }
    }

    #[track_caller]
    pub fn expect_root(&self) -> &ModelRoot {
        match &self.kind {
            ModelKind::Root(root) => root,
            ModelKind::Embedded => panic!("expected root model, but {} is embedded", self.name),
        }
    }

    #[track_caller]
    pub fn expect_root_mut(&mut self) -> &mut ModelRoot {
        match &mut self.kind {
            ModelKind::Root(root) => root,
            ModelKind::Embedded => panic!("expected root model, but {} is embedded", self.name),
        }
    }

    /// Returns the primary key if this is a root model, None if embedded
    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.as_root().and_then(|root| root.primary_key.as_ref())
    }

    /// Returns the primary key field of a built root model.
    #[track_caller]
    pub fn primary_key_field(&self) -> &Field {
        let pk = self
            .primary_key()
            .unwrap_or_else(|| panic!("model {} has no primary key", self.name));
        &self.fields[pk.field.index]
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_by_name_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.name == name)
    }
}

impl ModelId {
    /// Create a `FieldId` representing the current model's field at index
    /// `index`.
    pub const fn field(self, index: usize) -> FieldId {
        FieldId { model: self, index }
    }

    pub(crate) const fn placeholder() -> Self {
        Self(usize::MAX)
    }
}

impl From<&Self> for ModelId {
    fn from(src: &Self) -> Self {
        *src
    }
}

impl From<&Model> for ModelId {
    fn from(value: &Model) -> Self {
        value.id
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ModelId({})", self.0)
    }
}
