mod action;
pub use action::WriteAction;

mod delete;
pub use delete::DeleteRow;

mod expr;
pub use expr::PlanExpr;

mod insert;
pub use insert::InsertRow;

mod update;
pub use update::UpdateRow;

use ormlet_core::NodeId;

/// An ordered list of row writes executed as one atomic unit.
///
/// Plans are inspectable: [`Db::plan_save`](crate::Db::plan_save) and
/// [`Db::plan_remove`](crate::Db::plan_remove) return the plan that the
/// matching mutation would execute.
#[derive(Debug, Default)]
pub struct Plan {
    pub steps: Vec<WriteStep>,
}

/// A single write in a plan.
#[derive(Debug)]
pub struct WriteStep {
    /// The row write to perform
    pub action: WriteAction,

    /// The graph node this write persists, when it persists one
    pub node: Option<NodeId>,

    /// Short description of the step, used in logs and failure reports
    pub summary: String,
}

impl Plan {
    pub(crate) fn push(&mut self, step: WriteStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterates over the step summaries, in execution order.
    pub fn summaries(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().map(|step| &step.summary[..])
    }
}

impl WriteStep {
    pub(crate) fn new(action: impl Into<WriteAction>, summary: String) -> WriteStep {
        WriteStep {
            action: action.into(),
            node: None,
            summary,
        }
    }

    pub(crate) fn for_node(mut self, node: NodeId) -> WriteStep {
        self.node = Some(node);
        self
    }
}
