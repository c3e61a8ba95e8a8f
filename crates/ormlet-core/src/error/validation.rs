use super::{Error, ErrorKind};

/// An entity handed to the persistence layer does not match its schema.
#[derive(Debug)]
pub(super) struct ValidationError {
    kind: ValidationErrorKind,
}

#[derive(Debug)]
enum ValidationErrorKind {
    /// A required field has no value.
    MissingField { model: Box<str>, field: Box<str> },

    /// A null value was supplied for a non-nullable field.
    NullNotAllowed { model: Box<str>, field: Box<str> },

    /// A value does not match the declared field type.
    TypeMismatch {
        model: Box<str>,
        field: Box<str>,
        expected: Box<str>,
        actual: Box<str>,
    },

    /// A value was supplied for a field the model does not declare.
    UnknownField { model: Box<str>, field: Box<str> },

    /// A relation was referenced that the model does not declare.
    UnknownRelation { model: Box<str>, field: Box<str> },

    /// A string is not one of the declared enum variants.
    InvalidEnumVariant {
        model: Box<str>,
        field: Box<str>,
        value: Box<str>,
    },

    /// A relation references an unsaved entity and cascade insert is off.
    UnsavedRelated { model: Box<str>, field: Box<str> },

    /// An operation requires a primary key but the entity has none.
    MissingKey { model: Box<str> },
}

impl Error {
    /// Creates a validation error for a required field with no value.
    pub fn validation_missing_field(
        model: impl Into<String>,
        field: impl Into<String>,
    ) -> Error {
        Error::validation(ValidationErrorKind::MissingField {
            model: model.into().into(),
            field: field.into().into(),
        })
    }

    /// Creates a validation error for a null in a non-nullable field.
    pub fn validation_null_not_allowed(
        model: impl Into<String>,
        field: impl Into<String>,
    ) -> Error {
        Error::validation(ValidationErrorKind::NullNotAllowed {
            model: model.into().into(),
            field: field.into().into(),
        })
    }

    /// Creates a validation error for a value of the wrong type.
    pub fn validation_type_mismatch(
        model: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Error {
        Error::validation(ValidationErrorKind::TypeMismatch {
            model: model.into().into(),
            field: field.into().into(),
            expected: expected.into().into(),
            actual: actual.into().into(),
        })
    }

    /// Creates a validation error for an undeclared field.
    pub fn validation_unknown_field(
        model: impl Into<String>,
        field: impl Into<String>,
    ) -> Error {
        Error::validation(ValidationErrorKind::UnknownField {
            model: model.into().into(),
            field: field.into().into(),
        })
    }

    /// Creates a validation error for an undeclared relation.
    pub fn validation_unknown_relation(
        model: impl Into<String>,
        field: impl Into<String>,
    ) -> Error {
        Error::validation(ValidationErrorKind::UnknownRelation {
            model: model.into().into(),
            field: field.into().into(),
        })
    }

    /// Creates a validation error for a string outside the declared enum.
    pub fn validation_invalid_enum_variant(
        model: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Error {
        Error::validation(ValidationErrorKind::InvalidEnumVariant {
            model: model.into().into(),
            field: field.into().into(),
            value: value.into().into(),
        })
    }

    /// Creates a validation error for a relation to an unsaved entity.
    pub fn validation_unsaved_related(
        model: impl Into<String>,
        field: impl Into<String>,
    ) -> Error {
        Error::validation(ValidationErrorKind::UnsavedRelated {
            model: model.into().into(),
            field: field.into().into(),
        })
    }

    /// Creates a validation error for an operation that needs a key.
    pub fn validation_missing_key(model: impl Into<String>) -> Error {
        Error::validation(ValidationErrorKind::MissingKey {
            model: model.into().into(),
        })
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation(_))
    }

    fn validation(kind: ValidationErrorKind) -> Error {
        Error::new(ErrorKind::Validation(ValidationError { kind }))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::ValidationErrorKind::*;

        match &self.kind {
            MissingField { model, field } => {
                write!(f, "missing value for required field {model}.{field}")
            }
            NullNotAllowed { model, field } => {
                write!(f, "field {model}.{field} is not nullable")
            }
            TypeMismatch {
                model,
                field,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for field {model}.{field}: expected {expected}, got {actual}"
            ),
            UnknownField { model, field } => {
                write!(f, "model {model} has no field named {field}")
            }
            UnknownRelation { model, field } => {
                write!(f, "model {model} has no relation named {field}")
            }
            InvalidEnumVariant {
                model,
                field,
                value,
            } => write!(
                f,
                "value {value:?} is not a variant of enum field {model}.{field}"
            ),
            UnsavedRelated { model, field } => write!(
                f,
                "relation {model}.{field} references an unsaved entity and cascade insert is not enabled"
            ),
            MissingKey { model } => {
                write!(f, "entity {model} has no primary key value")
            }
        }
    }
}
