use ormlet_core::{stmt, NodeId};

/// A value position in a plan.
///
/// Keys assigned by the store are not known until the plan runs, so a
/// step may reference the key of a node inserted by an earlier step.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanExpr {
    /// A literal value
    Value(stmt::Value),

    /// The primary key of a graph node, assigned by an earlier insert in
    /// the same plan
    KeyOf(NodeId),
}

impl PlanExpr {
    pub fn null() -> PlanExpr {
        PlanExpr::Value(stmt::Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PlanExpr::Value(stmt::Value::Null))
    }

    pub fn as_value(&self) -> Option<&stmt::Value> {
        match self {
            PlanExpr::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_key_of(&self) -> Option<NodeId> {
        match self {
            PlanExpr::KeyOf(node) => Some(*node),
            _ => None,
        }
    }
}

impl From<stmt::Value> for PlanExpr {
    fn from(value: stmt::Value) -> PlanExpr {
        PlanExpr::Value(value)
    }
}

impl From<i64> for PlanExpr {
    fn from(value: i64) -> PlanExpr {
        PlanExpr::Value(value.into())
    }
}

impl From<NodeId> for PlanExpr {
    fn from(value: NodeId) -> PlanExpr {
        PlanExpr::KeyOf(value)
    }
}
