use super::*;

/// One side of a many-to-many relation.
///
/// The side declared with a join table owns the relation. Both sides are
/// resolved through the join table, which stores one row per linked pair
/// and nothing else.
#[derive(Debug, Clone)]
pub struct ManyToMany {
    /// Associated model
    pub target: ModelRef,

    /// The `ManyToMany` field on the target that pairs with this, if declared
    pub pair: Option<FieldRef>,

    /// Set on the owning side
    pub join_table: Option<JoinTable>,

    /// Operations that propagate to the members
    pub cascade: Cascade,
}

/// Join table configuration for the owning side of a many-to-many relation.
///
/// Defaults are derived when the schema is built: the table is named
/// `<owning table>_<field>_<target table>` and the key columns
/// `<owning table>_id` and `<target table>_id`.
#[derive(Debug, Clone, Default)]
pub struct JoinTable {
    pub name: Option<String>,
    pub source_column: Option<String>,
    pub target_column: Option<String>,
}

impl ManyToMany {
    pub fn is_owning(&self) -> bool {
        self.join_table.is_some()
    }

    pub fn target_id(&self) -> ModelId {
        self.target.expect_id()
    }

    pub fn target<'a>(&self, schema: &'a Schema) -> &'a Model {
        schema.model(self.target_id())
    }

    pub fn pair_id(&self) -> Option<FieldId> {
        self.pair.as_ref().map(FieldRef::expect_id)
    }
}

impl From<ManyToMany> for FieldTy {
    fn from(value: ManyToMany) -> Self {
        Self::ManyToMany(value)
    }
}
