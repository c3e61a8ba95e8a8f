use super::{FieldId, ModelId};

/// A reference to a model, by name until the schema is built.
///
/// Declarations can only name other models, since identifiers are assigned
/// during the build. The builder resolves every reference in place; after a
/// successful build all references are `Id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef {
    Name(String),
    Id(ModelId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Name(String),
    Id(FieldId),
}

impl ModelRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Id(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Id(_))
    }

    #[track_caller]
    pub fn expect_id(&self) -> ModelId {
        match self {
            Self::Id(id) => *id,
            Self::Name(name) => panic!("unresolved model reference: {name}"),
        }
    }
}

impl From<&str> for ModelRef {
    fn from(src: &str) -> Self {
        Self::Name(src.to_string())
    }
}

impl From<String> for ModelRef {
    fn from(src: String) -> Self {
        Self::Name(src)
    }
}

impl From<ModelId> for ModelRef {
    fn from(src: ModelId) -> Self {
        Self::Id(src)
    }
}

impl FieldRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Id(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Id(_))
    }

    #[track_caller]
    pub fn expect_id(&self) -> FieldId {
        match self {
            Self::Id(id) => *id,
            Self::Name(name) => panic!("unresolved field reference: {name}"),
        }
    }
}

impl From<&str> for FieldRef {
    fn from(src: &str) -> Self {
        Self::Name(src.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(src: String) -> Self {
        Self::Name(src)
    }
}

impl From<FieldId> for FieldRef {
    fn from(src: FieldId) -> Self {
        Self::Id(src)
    }
}
