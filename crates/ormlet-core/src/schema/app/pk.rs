use super::FieldId;

#[derive(Debug, Clone)]
pub struct PrimaryKey {
    /// The field holding the key
    pub field: FieldId,
}
