mod adhoc;
mod configuration;
mod driver;
mod record_not_found;
mod too_many_records;
mod transaction_failure;
mod validation;

use adhoc::AdhocError;
use configuration::ConfigurationError;
use driver::DriverError;
use record_not_found::RecordNotFoundError;
use too_many_records::TooManyRecordsError;
use transaction_failure::TransactionFailureError;
use validation::ValidationError;

use std::sync::Arc;

/// An error that can occur in Ormlet.
///
/// Errors are cheap to clone and can carry a cause chain. Context is
/// displayed outermost-first, ending with the root cause.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Anyhow(anyhow::Error),
    Configuration(ConfigurationError),
    Driver(DriverError),
    RecordNotFound(RecordNotFoundError),
    TooManyRecords(TooManyRecordsError),
    TransactionFailure(TransactionFailureError),
    Validation(ValidationError),
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self::with_cause(kind, None)
    }

    fn with_cause(kind: ErrorKind, cause: Option<Error>) -> Self {
        Self {
            inner: Arc::new(ErrorInner { kind, cause }),
        }
    }

    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }

    /// Creates an ad-hoc error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Adhoc(AdhocError::new(message)))
    }

    /// Wraps this error with an outer message.
    ///
    /// Context is displayed in reverse order: the most recently added context
    /// is shown first, ending with the root cause.
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::with_cause(ErrorKind::Adhoc(AdhocError::new(message)), Some(self))
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.inner.cause {
            Some(cause) => Some(cause),
            None => match self.kind() {
                ErrorKind::Anyhow(err) => Some(err.as_ref()),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            std::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !f.alternate() {
            std::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Adhoc(err) => std::fmt::Display::fmt(err, f),
            Anyhow(err) => std::fmt::Display::fmt(err, f),
            Configuration(err) => std::fmt::Display::fmt(err, f),
            Driver(err) => std::fmt::Display::fmt(err, f),
            RecordNotFound(err) => std::fmt::Display::fmt(err, f),
            TooManyRecords(err) => std::fmt::Display::fmt(err, f),
            TransactionFailure(err) => std::fmt::Display::fmt(err, f),
            Validation(err) => std::fmt::Display::fmt(err, f),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::new(ErrorKind::Anyhow(err))
    }
}
