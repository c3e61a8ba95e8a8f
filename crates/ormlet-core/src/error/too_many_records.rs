use super::{Error, ErrorKind};

/// A query expected at most one record but matched several.
#[derive(Debug)]
pub(super) struct TooManyRecordsError {
    context: Box<str>,
}

impl Error {
    /// Creates a too-many-records error.
    pub fn too_many_records(context: impl Into<String>) -> Error {
        Error::new(ErrorKind::TooManyRecords(TooManyRecordsError {
            context: context.into().into(),
        }))
    }

    /// Returns true if this is a too-many-records error.
    pub fn is_too_many_records(&self) -> bool {
        matches!(self.kind(), ErrorKind::TooManyRecords(_))
    }
}

impl std::fmt::Display for TooManyRecordsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected at most one record: {}", self.context)
    }
}
