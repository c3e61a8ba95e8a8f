use super::*;
use crate::{
    schema::db::{ColumnId, TableId},
    stmt,
};

#[derive(Debug, Clone)]
pub struct QueryTable {
    /// Which table to read
    pub table: TableId,

    /// Which rows to return
    pub filter: RowFilter,
}

/// A conjunction of column predicates, lowered from a model-level filter.
#[derive(Debug, Default, Clone)]
pub struct RowFilter {
    pub predicates: Vec<(ColumnId, Predicate)>,
}

#[derive(Debug, Clone)]
pub enum Predicate {
    /// The column equals the value
    Eq(stmt::Value),

    /// The column equals one of the values
    In(Vec<stmt::Value>),
}

impl RowFilter {
    /// A filter matching every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: ColumnId, value: impl Into<stmt::Value>) -> Self {
        self.predicates.push((column, Predicate::Eq(value.into())));
        self
    }

    pub fn in_set(mut self, column: ColumnId, values: Vec<stmt::Value>) -> Self {
        self.predicates.push((column, Predicate::In(values)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluates the filter against a stored row.
    pub fn matches(&self, row: &[stmt::Value]) -> bool {
        self.predicates.iter().all(|(column, predicate)| {
            let value = &row[column.index];
            match predicate {
                Predicate::Eq(expected) => value == expected,
                Predicate::In(set) => set.contains(value),
            }
        })
    }
}

impl From<QueryTable> for Operation {
    fn from(value: QueryTable) -> Self {
        Self::QueryTable(value)
    }
}
