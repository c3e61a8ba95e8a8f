use crate::schema::db::ColumnId;
use crate::stmt;

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Operation result rows
    Values(Vec<Row>),
}

/// A row of column values.
///
/// Query responses hold full rows, one value per table column. Insert
/// responses hold only the requested returning columns, in the order
/// they were requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(pub Vec<stmt::Value>);

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn values(rows: Vec<Row>) -> Self {
        Self {
            rows: Rows::Values(rows),
        }
    }

    pub fn empty() -> Self {
        Self::values(vec![])
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    #[track_caller]
    pub fn into_count(self) -> u64 {
        match self {
            Self::Count(count) => count,
            _ => panic!("expected count response, but was {self:#?}"),
        }
    }

    #[track_caller]
    pub fn into_values(self) -> Vec<Row> {
        match self {
            Self::Values(rows) => rows,
            _ => panic!("expected value response, but was {self:#?}"),
        }
    }
}

impl Row {
    /// The value stored in the given column.
    pub fn col(&self, id: ColumnId) -> &stmt::Value {
        &self.0[id.index]
    }
}
