use super::*;

/// The owning side of a many-to-one relation.
///
/// The foreign key column lives on this model's table and stores the
/// target's primary key.
#[derive(Debug, Clone)]
pub struct ManyToOne {
    /// Associated model
    pub target: ModelRef,

    /// The `OneToMany` field that pairs with this, if declared
    pub pair: Option<FieldRef>,

    /// Operations that propagate to the target
    pub cascade: Cascade,
}

impl ManyToOne {
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

impl From<ManyToOne> for FieldTy {
    fn from(value: ManyToOne) -> Self {
        Self::ManyToOne(value)
    }
}
