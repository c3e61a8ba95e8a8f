use super::{Entity, EntityRef};

use std::fmt;
use std::ops;

/// An arena of entities connected by relation edges.
///
/// The graph owns every entity; relations refer to other entities by
/// [`NodeId`] or by key. A unit of work (one save or remove call) operates
/// on a single graph.
#[derive(Debug, Default)]
pub struct EntityGraph {
    nodes: Vec<Entity>,
}

/// Identifies an entity within a graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity to the graph, returning its node.
    pub fn add(&mut self, entity: Entity) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(entity);
        node
    }

    pub fn entity(&self, node: NodeId) -> &Entity {
        &self.nodes[node.0]
    }

    pub fn entity_mut(&mut self, node: NodeId) -> &mut Entity {
        &mut self.nodes[node.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Links a to-one relation between two nodes.
    pub fn set_one(&mut self, node: NodeId, field: impl Into<String>, target: NodeId) {
        self.nodes[node.0].set_one(field, target);
    }

    /// Sets the member set of a to-many relation to the given nodes.
    pub fn set_many(&mut self, node: NodeId, field: impl Into<String>, members: &[NodeId]) {
        self.nodes[node.0].set_many(field, members.iter().copied());
    }

    /// Appends a member to a node's to-many relation.
    pub fn push_related(&mut self, node: NodeId, field: impl Into<String>, member: NodeId) {
        self.nodes[node.0].push_related(field, member);
    }

    /// Resolves a reference to a key, reading through nodes in this graph.
    pub fn key_of(&self, entity_ref: EntityRef) -> Option<i64> {
        match entity_ref {
            EntityRef::Key(key) => Some(key),
            EntityRef::Node(node) => self.entity(node).key(),
        }
    }
}

impl ops::Index<NodeId> for EntityGraph {
    type Output = Entity;

    fn index(&self, node: NodeId) -> &Entity {
        self.entity(node)
    }
}

impl ops::IndexMut<NodeId> for EntityGraph {
    fn index_mut(&mut self, node: NodeId) -> &mut Entity {
        self.entity_mut(node)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "NodeId({})", self.0)
    }
}
