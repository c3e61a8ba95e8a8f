use super::{Error, ErrorKind};

/// A schema was declared in a way that cannot be realized.
///
/// Configuration errors are raised while building the schema, before any
/// statement reaches a driver. Examples: a relation naming an unregistered
/// model, both sides of a relation claiming the foreign key, or two
/// flattened embedded fields colliding on a column name.
#[derive(Debug)]
pub(super) struct ConfigurationError {
    message: Box<str>,
}

impl Error {
    /// Creates a schema configuration error.
    pub fn configuration(message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Configuration(ConfigurationError {
            message: message.into().into(),
        }))
    }

    /// Returns true if this is a schema configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration(_))
    }
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid schema configuration: {}", self.message)
    }
}
