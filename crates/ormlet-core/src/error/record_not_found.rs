use super::{Error, ErrorKind};

/// A query expected a record that does not exist.
#[derive(Debug)]
pub(super) struct RecordNotFoundError {
    context: Box<str>,
}

impl Error {
    /// Creates a record-not-found error.
    ///
    /// The context should describe what was looked for, e.g. the model name
    /// and the filter.
    pub fn record_not_found(context: impl Into<String>) -> Error {
        Error::new(ErrorKind::RecordNotFound(RecordNotFoundError {
            context: context.into().into(),
        }))
    }

    /// Returns true if this is a record-not-found error.
    pub fn is_record_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::RecordNotFound(_))
    }
}

impl std::fmt::Display for RecordNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record not found: {}", self.context)
    }
}
