use ormlet_core::{
    driver::{
        operation::{DeleteByKey, Insert, QueryTable, Transaction, UpdateByKey},
        Response, Row,
    },
    schema::db::{ColumnId, Schema, Table, TableId},
    stmt::Value,
    Error, Result,
};

use std::collections::BTreeMap;

/// Table contents, one slot per schema table.
#[derive(Debug, Default)]
pub(crate) struct Store {
    tables: Vec<TableData>,

    /// Full copy of `tables` taken when a transaction starts.
    snapshot: Option<Vec<TableData>>,

    registered: bool,
}

#[derive(Debug, Clone)]
struct TableData {
    /// Next value handed out for an auto-increment key
    next_key: i64,

    /// Stored rows in key order, each holding one value per column
    rows: BTreeMap<RowKey, Vec<Value>>,
}

/// Primary key of a stored row.
///
/// Entity tables key on a single integer. Join tables key on the pair of
/// foreign keys, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RowKey {
    Int(i64),
    Pair(i64, i64),
}

impl Default for TableData {
    fn default() -> Self {
        Self {
            next_key: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl Store {
    pub(crate) fn register(&mut self, schema: &Schema) {
        if self.registered {
            return;
        }

        self.tables = schema.tables.iter().map(|_| TableData::default()).collect();
        self.registered = true;
    }

    pub(crate) fn insert(&mut self, schema: &Schema, op: Insert) -> Result<Response> {
        let table = schema.table(op.table);
        let count = op.rows.len() as u64;
        let mut returned = vec![];

        for mut row in op.rows {
            if row.len() != table.columns.len() {
                return Err(Error::driver_operation(format!(
                    "insert into `{}` expects {} values, got {}",
                    table.name,
                    table.columns.len(),
                    row.len()
                )));
            }

            self.assign_keys(table, &mut row)?;

            let data = self.data(op.table);
            check_row(table, data, &row, None)?;

            let key = stored_key(table, &row)?;
            if data.rows.contains_key(&key) {
                let pk = table.primary_key_columns().next().expect("table has no key");
                return Err(Error::driver_unique_violation(&table.name, &pk.name));
            }

            if let Some(returning) = &op.returning {
                let values = returning.iter().map(|id| row[id.index].clone()).collect();
                returned.push(Row(values));
            }

            self.data(op.table).rows.insert(key, row);
        }

        match op.returning {
            Some(_) => Ok(Response::values(returned)),
            None => Ok(Response::count(count)),
        }
    }

    pub(crate) fn update_by_key(&mut self, schema: &Schema, op: UpdateByKey) -> Result<Response> {
        let table = schema.table(op.table);
        let key = request_key(table, &op.key)?;

        let Some(current) = self.data(op.table).rows.get(&key) else {
            // The row may have been removed earlier in the same plan.
            return Ok(Response::count(0));
        };

        let mut row = current.clone();
        for (column, value) in &op.assignments {
            if table.column(*column).primary_key {
                return Err(Error::driver_operation(format!(
                    "key column `{}`.`{}` cannot be reassigned",
                    table.name,
                    table.column(*column).name
                )));
            }
            row[column.index] = value.clone();
        }

        check_row(table, self.data(op.table), &row, Some(key))?;
        self.data(op.table).rows.insert(key, row);
        Ok(Response::count(1))
    }

    pub(crate) fn delete_by_key(&mut self, schema: &Schema, op: DeleteByKey) -> Result<Response> {
        let table = schema.table(op.table);

        let mut count = 0;
        for value in &op.keys {
            let key = request_key(table, value)?;
            if self.data(op.table).rows.remove(&key).is_some() {
                count += 1;
            }
        }

        Ok(Response::count(count))
    }

    pub(crate) fn query_table(&mut self, op: QueryTable) -> Result<Response> {
        let rows = self
            .data(op.table)
            .rows
            .values()
            .filter(|row| op.filter.matches(row))
            .map(|row| Row(row.clone()))
            .collect();

        Ok(Response::values(rows))
    }

    pub(crate) fn transaction(&mut self, op: Transaction) -> Result<Response> {
        match op {
            Transaction::Start => {
                if self.snapshot.is_some() {
                    return Err(Error::driver_operation("a transaction is already in progress"));
                }
                self.snapshot = Some(self.tables.clone());
            }
            Transaction::Commit => {
                if self.snapshot.take().is_none() {
                    return Err(Error::driver_operation("no transaction in progress"));
                }
            }
            Transaction::Rollback => {
                let Some(snapshot) = self.snapshot.take() else {
                    return Err(Error::driver_operation("no transaction in progress"));
                };
                self.tables = snapshot;
            }
        }

        Ok(Response::count(0))
    }

    /// Populates auto-increment key columns and tracks explicit keys so
    /// later assignments never collide.
    fn assign_keys(&mut self, table: &Table, row: &mut [Value]) -> Result<()> {
        let data = self.data(table.id);

        for column in table.primary_key_columns() {
            let value = &mut row[column.id.index];
            match value {
                Value::Null if column.auto_increment => {
                    *value = Value::I64(data.next_key);
                    data.next_key += 1;
                }
                Value::Null => {
                    return Err(Error::driver_operation(format!(
                        "missing key value for `{}`.`{}`",
                        table.name, column.name
                    )));
                }
                Value::I64(key) => data.next_key = data.next_key.max(*key + 1),
                other => {
                    return Err(Error::driver_operation(format!(
                        "key column `{}`.`{}` must be an integer, got {}",
                        table.name,
                        column.name,
                        other.type_name()
                    )));
                }
            }
        }

        Ok(())
    }

    fn data(&mut self, table: TableId) -> &mut TableData {
        self.tables.get_mut(table.0).expect("schema not registered")
    }
}

/// Enforces not-null and unique constraints for a row about to be stored.
///
/// `skip` names the row being replaced so an update does not collide with
/// its own stored values.
fn check_row(table: &Table, data: &TableData, row: &[Value], skip: Option<RowKey>) -> Result<()> {
    for column in &table.columns {
        if !column.nullable && row[column.id.index].is_null() {
            return Err(Error::driver_operation(format!(
                "null value in non-nullable column `{}`.`{}`",
                table.name, column.name
            )));
        }
    }

    for column in &table.columns {
        // Key uniqueness is enforced by the row map itself.
        if !column.unique || column.primary_key {
            continue;
        }

        let value = &row[column.id.index];
        if value.is_null() {
            continue;
        }

        for (key, existing) in &data.rows {
            if skip == Some(*key) {
                continue;
            }
            if existing[column.id.index] == *value {
                return Err(Error::driver_unique_violation(&table.name, &column.name));
            }
        }
    }

    Ok(())
}

/// The map key for a row that already holds its key values.
fn stored_key(table: &Table, row: &[Value]) -> Result<RowKey> {
    let key_of = |id: ColumnId| {
        row[id.index].as_i64().ok_or_else(|| {
            Error::driver_operation(format!(
                "key column `{}`.`{}` must be an integer",
                table.name,
                table.column(id).name
            ))
        })
    };

    match table.primary_key[..] {
        [id] => Ok(RowKey::Int(key_of(id)?)),
        [a, b] => Ok(RowKey::Pair(key_of(a)?, key_of(b)?)),
        _ => Err(Error::driver_operation(format!(
            "table `{}` has an unsupported primary key shape",
            table.name
        ))),
    }
}

/// Decodes the key value sent with an update or delete.
fn request_key(table: &Table, value: &Value) -> Result<RowKey> {
    match (&table.primary_key[..], value) {
        ([_], Value::I64(key)) => Ok(RowKey::Int(*key)),
        ([_, _], Value::Record(pair)) if pair.len() == 2 => match (&pair[0], &pair[1]) {
            (Value::I64(a), Value::I64(b)) => Ok(RowKey::Pair(*a, *b)),
            _ => Err(malformed_key(table, value)),
        },
        _ => Err(malformed_key(table, value)),
    }
}

fn malformed_key(table: &Table, value: &Value) -> Error {
    Error::driver_operation(format!(
        "malformed key for table `{}`: {value:?}",
        table.name
    ))
}
