use super::{Error, ErrorKind};

/// A persistence plan failed part-way through and was rolled back.
///
/// Carries enough identity to point at the failed step. The underlying
/// driver error is attached as the cause.
#[derive(Debug)]
pub(super) struct TransactionFailureError {
    step: usize,
    operation: Box<str>,
}

impl Error {
    /// Creates a transaction failure error for the given plan step.
    pub fn transaction_failure(
        step: usize,
        operation: impl Into<String>,
        cause: Error,
    ) -> Error {
        Error::with_cause(
            ErrorKind::TransactionFailure(TransactionFailureError {
                step,
                operation: operation.into().into(),
            }),
            Some(cause),
        )
    }

    /// Returns true if this is a transaction failure.
    pub fn is_transaction_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::TransactionFailure(_))
    }

    /// Returns the zero-based index of the plan step that failed.
    pub fn failed_step(&self) -> Option<usize> {
        match self.kind() {
            ErrorKind::TransactionFailure(err) => Some(err.step),
            _ => None,
        }
    }

    /// Returns a description of the operation that failed.
    pub fn failed_operation(&self) -> Option<&str> {
        match self.kind() {
            ErrorKind::TransactionFailure(err) => Some(&err.operation),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionFailureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "transaction failed at step {} ({})",
            self.step, self.operation
        )
    }
}
