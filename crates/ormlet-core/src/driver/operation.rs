mod delete_by_key;
pub use delete_by_key::DeleteByKey;

mod insert;
pub use insert::Insert;

mod query_table;
pub use query_table::{Predicate, QueryTable, RowFilter};

mod transaction;
pub use transaction::Transaction;

mod update_by_key;
pub use update_by_key::UpdateByKey;

use super::*;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Create new records
    Insert(Insert),

    /// Delete records identified by the given keys
    DeleteByKey(DeleteByKey),

    /// Query the table, filtering by column predicates
    QueryTable(QueryTable),

    /// Execute a transaction lifecycle op
    Transaction(Transaction),

    /// Update a record by the primary key
    UpdateByKey(UpdateByKey),
}
