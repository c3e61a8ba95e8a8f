use crate::schema::{
    app::ModelId,
    db::{ColumnId, TableId},
};

/// Defines the mapping between a single model and its backing table.
#[derive(Debug, Clone)]
pub struct Model {
    /// The model this mapping applies to.
    pub id: ModelId,

    /// The database table that stores this model's data.
    pub table: TableId,

    /// Per-field mappings, indexed by field position within the model.
    pub fields: Vec<FieldMapping>,

    /// Set when several models share the table. The column holds a type tag
    /// and rows belonging to this model carry the given value.
    pub discriminator: Option<(ColumnId, String)>,
}

/// How a single field is stored.
#[derive(Debug, Clone)]
pub enum FieldMapping {
    /// The field is stored in one column. Primitive fields, foreign keys of
    /// many-to-one fields, and foreign keys of owning one-to-one fields map
    /// this way.
    Column(ColumnId),

    /// An embedded field, flattened into one mapping per inner field.
    Embedded(Vec<FieldMapping>),

    /// A many-to-many field, resolved through a join table.
    JoinTable(JoinTableMapping),

    /// The field has no storage of its own. One-to-many fields and inverse
    /// one-to-one fields are resolved through the target's storage.
    None,
}

/// Join table storage for one side of a many-to-many relation.
///
/// `source_column` holds keys of the side this mapping belongs to, so the
/// inverse side's mapping has the columns swapped.
#[derive(Debug, Clone, Copy)]
pub struct JoinTableMapping {
    pub table: TableId,
    pub source_column: ColumnId,
    pub target_column: ColumnId,
}

impl Model {
    /// The tag value identifying this model's rows, when the table is shared.
    pub fn tag(&self) -> Option<&str> {
        self.discriminator.as_ref().map(|(_, tag)| tag.as_str())
    }

    pub fn field(&self, index: usize) -> &FieldMapping {
        &self.fields[index]
    }
}

impl FieldMapping {
    pub fn as_column(&self) -> Option<ColumnId> {
        match self {
            Self::Column(column) => Some(*column),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_column(&self) -> ColumnId {
        match self {
            Self::Column(column) => *column,
            _ => panic!("expected column mapping, but was {self:?}"),
        }
    }

    pub fn as_embedded(&self) -> Option<&[FieldMapping]> {
        match self {
            Self::Embedded(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_join_table(&self) -> Option<&JoinTableMapping> {
        match self {
            Self::JoinTable(join_table) => Some(join_table),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_join_table(&self) -> &JoinTableMapping {
        match self {
            Self::JoinTable(join_table) => join_table,
            _ => panic!("expected join table mapping, but was {self:?}"),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
