use super::{FieldTy, ModelRef};

/// A field holding an embedded model.
///
/// The embedded model's fields are flattened into the owning model's table,
/// each column named `<field>_<inner field>`.
#[derive(Debug, Clone)]
pub struct Embedded {
    /// The embedded model
    pub target: ModelRef,
}

impl From<Embedded> for FieldTy {
    fn from(value: Embedded) -> Self {
        Self::Embedded(value)
    }
}
