use super::*;

/// The inverse side of a many-to-one relation.
///
/// Holds no storage of its own. Members are found by querying the target's
/// foreign key column.
#[derive(Debug, Clone)]
pub struct OneToMany {
    /// Associated model
    pub target: ModelRef,

    /// The `ManyToOne` field on the target that holds the foreign key
    pub pair: FieldRef,

    /// Operations that propagate to the members
    pub cascade: Cascade,
}

impl OneToMany {
    pub fn target_id(&self) -> ModelId {
        self.target.expect_id()
    }

    pub fn target<'a>(&self, schema: &'a Schema) -> &'a Model {
        schema.model(self.target_id())
    }

    pub fn pair_id(&self) -> FieldId {
        self.pair.expect_id()
    }

    pub fn pair<'a>(&self, schema: &'a Schema) -> &'a ManyToOne {
        schema.field(self.pair_id()).ty.expect_many_to_one()
    }
}

impl From<OneToMany> for FieldTy {
    fn from(value: OneToMany) -> Self {
        Self::OneToMany(value)
    }
}
