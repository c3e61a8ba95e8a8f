use super::Value;

use std::fmt;

/// A conjunction of field equality predicates.
///
/// Filters are expressed against model fields and lowered to column
/// predicates before they reach a driver. An empty filter matches every
/// record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter matching the record with the given primary key.
    pub fn by_key(key: i64) -> Self {
        Self::eq("id", key)
    }

    /// A filter with a single equality predicate.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and(field, value)
    }

    /// Adds an equality predicate to the filter.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push((field.into(), value.into()));
        self
    }

    pub fn predicates(&self) -> &[(String, Value)] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return write!(f, "anything");
        }

        for (i, (field, value)) in self.predicates.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }

            match value {
                Value::Bool(v) => write!(f, "{field}={v}")?,
                Value::I64(v) => write!(f, "{field}={v}")?,
                Value::String(v) => write!(f, "{field}={v}")?,
                Value::Null => write!(f, "{field}=null")?,
                other => write!(f, "{field}={other:?}")?,
            }
        }

        Ok(())
    }
}
