use super::*;

/// One side of a one-to-one relation.
///
/// The side declared with a join column owns the relation and stores the
/// foreign key in a unique column. The other side holds no storage and is
/// resolved by querying the owner's foreign key column.
#[derive(Debug, Clone)]
pub struct OneToOne {
    /// Associated model
    pub target: ModelRef,

    /// The `OneToOne` field on the target that pairs with this, if declared
    pub pair: Option<FieldRef>,

    /// True if this side holds the foreign key
    pub join_column: bool,

    /// Operations that propagate to the target
    pub cascade: Cascade,
}

impl OneToOne {
    pub fn is_owning(&self) -> bool {
        self.join_column
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

impl From<OneToOne> for FieldTy {
    fn from(value: OneToOne) -> Self {
        Self::OneToOne(value)
    }
}
