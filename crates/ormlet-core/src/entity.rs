mod graph;
pub use graph::{EntityGraph, NodeId};

use crate::schema::app::ModelId;
use crate::stmt;

use indexmap::IndexMap;

/// A dynamic instance of a model.
///
/// Entities hold field values by name and are validated against the schema
/// when a plan is built. Relations reference other entities by key or by
/// node, never by direct pointer, so bidirectional relations cannot form
/// ownership cycles.
#[derive(Debug, Clone)]
pub struct Entity {
    /// The model this entity is an instance of
    pub model: ModelId,

    /// Field values, keyed by field name
    pub fields: IndexMap<String, FieldValue>,
}

/// A single field slot on an entity.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A primitive or embedded value
    Value(stmt::Value),

    /// A relation edge
    Relation(RelationValue),
}

/// The state of a relation field.
#[derive(Debug, Clone)]
pub enum RelationValue {
    /// The relation was not requested when the entity was loaded. Saving an
    /// entity leaves not-loaded relations untouched.
    NotLoaded,

    /// A to-one relation; `None` means explicitly unlinked.
    One(Option<EntityRef>),

    /// A to-many relation holding the complete member set.
    Many(Vec<EntityRef>),
}

/// A reference to a related entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    /// An already-persisted entity, referenced by primary key
    Key(i64),

    /// An entity in the same graph
    Node(NodeId),
}

impl Entity {
    pub fn new(model: impl Into<ModelId>) -> Self {
        Self {
            model: model.into(),
            fields: IndexMap::new(),
        }
    }

    /// Sets a field value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<stmt::Value>) {
        self.fields
            .insert(field.into(), FieldValue::Value(value.into()));
    }

    /// Sets a field value, consuming and returning the entity.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<stmt::Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&stmt::Value> {
        match self.fields.get(field) {
            Some(FieldValue::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// The entity's primary key, if one has been assigned.
    pub fn key(&self) -> Option<i64> {
        self.get("id").and_then(stmt::Value::as_i64)
    }

    pub fn set_key(&mut self, key: i64) {
        self.set("id", key);
    }

    /// Clears the primary key, returning the entity to the unsaved state.
    pub fn clear_key(&mut self) {
        self.set("id", stmt::Value::Null);
    }

    /// Links a to-one relation.
    pub fn set_one(&mut self, field: impl Into<String>, target: impl Into<EntityRef>) {
        self.fields.insert(
            field.into(),
            FieldValue::Relation(RelationValue::One(Some(target.into()))),
        );
    }

    /// Unlinks a to-one relation.
    pub fn clear_one(&mut self, field: impl Into<String>) {
        self.fields
            .insert(field.into(), FieldValue::Relation(RelationValue::One(None)));
    }

    /// Sets the complete member set of a to-many relation.
    pub fn set_many(
        &mut self,
        field: impl Into<String>,
        members: impl IntoIterator<Item = impl Into<EntityRef>>,
    ) {
        self.fields.insert(
            field.into(),
            FieldValue::Relation(RelationValue::Many(
                members.into_iter().map(Into::into).collect(),
            )),
        );
    }

    /// Appends a member to a to-many relation, creating it if needed.
    pub fn push_related(&mut self, field: impl Into<String>, member: impl Into<EntityRef>) {
        let slot = self
            .fields
            .entry(field.into())
            .or_insert(FieldValue::Relation(RelationValue::Many(vec![])));

        match slot {
            FieldValue::Relation(RelationValue::Many(members)) => members.push(member.into()),
            _ => *slot = FieldValue::Relation(RelationValue::Many(vec![member.into()])),
        }
    }

    /// Removes a member from a to-many relation.
    pub fn remove_related(&mut self, field: &str, member: EntityRef) {
        if let Some(FieldValue::Relation(RelationValue::Many(members))) = self.fields.get_mut(field)
        {
            members.retain(|existing| *existing != member);
        }
    }

    pub fn relation(&self, field: &str) -> Option<&RelationValue> {
        match self.fields.get(field) {
            Some(FieldValue::Relation(relation)) => Some(relation),
            _ => None,
        }
    }

    pub fn relation_mut(&mut self, field: &str) -> Option<&mut RelationValue> {
        match self.fields.get_mut(field) {
            Some(FieldValue::Relation(relation)) => Some(relation),
            _ => None,
        }
    }
}

impl RelationValue {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Self::NotLoaded)
    }

    pub fn as_one(&self) -> Option<&Option<EntityRef>> {
        match self {
            Self::One(target) => Some(target),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[EntityRef]> {
        match self {
            Self::Many(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_many_mut(&mut self) -> Option<&mut Vec<EntityRef>> {
        match self {
            Self::Many(members) => Some(members),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_many(&self) -> &[EntityRef] {
        match self {
            Self::Many(members) => members,
            _ => panic!("expected loaded to-many relation, but was {self:?}"),
        }
    }
}

impl EntityRef {
    pub fn as_key(&self) -> Option<i64> {
        match self {
            Self::Key(key) => Some(*key),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(node) => Some(*node),
            _ => None,
        }
    }
}

impl From<i64> for EntityRef {
    fn from(key: i64) -> Self {
        Self::Key(key)
    }
}

impl From<NodeId> for EntityRef {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}
