use super::{Error, ErrorKind};

/// An error reported by the storage driver.
#[derive(Debug)]
pub(super) struct DriverError {
    kind: DriverErrorKind,
}

#[derive(Debug)]
enum DriverErrorKind {
    /// The driver could not carry out an operation.
    Operation(Box<str>),

    /// The connection URL could not be parsed or names an unknown scheme.
    InvalidUrl(Box<str>),

    /// A write would duplicate a value in a unique column.
    UniqueViolation { table: Box<str>, column: Box<str> },
}

impl Error {
    /// Creates an error describing a failed driver operation.
    pub fn driver_operation(message: impl Into<String>) -> Error {
        Error::driver_kind(DriverErrorKind::Operation(message.into().into()))
    }

    /// Creates an error describing an invalid connection URL.
    pub fn invalid_connection_url(message: impl Into<String>) -> Error {
        Error::driver_kind(DriverErrorKind::InvalidUrl(message.into().into()))
    }

    /// Creates an error describing a unique constraint violation.
    pub fn driver_unique_violation(
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Error {
        Error::driver_kind(DriverErrorKind::UniqueViolation {
            table: table.into().into(),
            column: column.into().into(),
        })
    }

    /// Returns true if this is a driver error.
    pub fn is_driver(&self) -> bool {
        matches!(self.kind(), ErrorKind::Driver(_))
    }

    /// Returns true if this error is a unique constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Driver(DriverError {
                kind: DriverErrorKind::UniqueViolation { .. },
            })
        )
    }

    fn driver_kind(kind: DriverErrorKind) -> Error {
        Error::new(ErrorKind::Driver(DriverError { kind }))
    }
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::DriverErrorKind::*;

        match &self.kind {
            Operation(message) => write!(f, "driver operation failed: {message}"),
            InvalidUrl(message) => write!(f, "invalid connection URL: {message}"),
            UniqueViolation { table, column } => {
                write!(f, "unique constraint violated: {table}.{column}")
            }
        }
    }
}
