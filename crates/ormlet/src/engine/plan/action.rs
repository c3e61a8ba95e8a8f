use super::{DeleteRow, InsertRow, UpdateRow};

#[derive(Debug)]
pub enum WriteAction {
    /// Insert one row
    Insert(InsertRow),

    /// Update columns of one row, identified by key
    Update(UpdateRow),

    /// Delete one row, identified by key
    Delete(DeleteRow),
}

impl WriteAction {
    pub fn is_insert(&self) -> bool {
        matches!(self, WriteAction::Insert(_))
    }

    pub fn is_update(&self) -> bool {
        matches!(self, WriteAction::Update(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, WriteAction::Delete(_))
    }

    pub fn as_insert(&self) -> Option<&InsertRow> {
        match self {
            WriteAction::Insert(action) => Some(action),
            _ => None,
        }
    }

    pub fn as_update(&self) -> Option<&UpdateRow> {
        match self {
            WriteAction::Update(action) => Some(action),
            _ => None,
        }
    }

    pub fn as_delete(&self) -> Option<&DeleteRow> {
        match self {
            WriteAction::Delete(action) => Some(action),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_insert(&self) -> &InsertRow {
        match self {
            WriteAction::Insert(action) => action,
            _ => panic!("expected WriteAction::Insert; {self:#?}"),
        }
    }

    #[track_caller]
    pub fn expect_delete(&self) -> &DeleteRow {
        match self {
            WriteAction::Delete(action) => action,
            _ => panic!("expected WriteAction::Delete; {self:#?}"),
        }
    }
}

impl From<InsertRow> for WriteAction {
    fn from(value: InsertRow) -> WriteAction {
        WriteAction::Insert(value)
    }
}

impl From<UpdateRow> for WriteAction {
    fn from(value: UpdateRow) -> WriteAction {
        WriteAction::Update(value)
    }
}

impl From<DeleteRow> for WriteAction {
    fn from(value: DeleteRow) -> WriteAction {
        WriteAction::Delete(value)
    }
}
