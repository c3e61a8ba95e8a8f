use crate::db::Db;
use crate::plan::{Plan, PlanExpr, WriteAction, WriteStep};

use ormlet_core::{
    driver::{
        operation::{DeleteByKey, Insert, Transaction, UpdateByKey},
        Operation, Response,
    },
    stmt, Error, NodeId, Result,
};

use std::collections::HashMap;
use tracing::{debug, warn};

/// Keys the store assigned during execution, to write back into the
/// graph once the plan has committed.
pub(crate) struct ExecOutcome {
    pub(crate) assigned: Vec<(NodeId, i64)>,
}

/// Runs a plan as one atomic unit.
///
/// A failing step rolls the transaction back, so the store is left as it
/// was before the call, and the error carries the step's position and
/// summary.
pub(crate) async fn execute(db: &Db, plan: &Plan) -> Result<ExecOutcome> {
    let mut outcome = ExecOutcome { assigned: vec![] };

    if plan.is_empty() {
        return Ok(outcome);
    }

    let driver = &db.driver;
    let schema = &db.schema.db;

    driver.exec(schema, Transaction::Start.into()).await?;

    let mut assigned: HashMap<NodeId, i64> = HashMap::new();

    for (index, step) in plan.steps.iter().enumerate() {
        debug!(step = index, summary = %step.summary, "executing plan step");

        let response = match driver.exec(schema, realize(step, &assigned)).await {
            Ok(response) => response,
            Err(err) => {
                warn!(step = index, summary = %step.summary, "plan step failed, rolling back");
                let _ = driver.exec(schema, Transaction::Rollback.into()).await;

                return Err(Error::transaction_failure(index, step.summary.clone(), err));
            }
        };

        // Store-assigned keys feed later steps and the graph write-back
        if let (WriteAction::Insert(insert), Some(node)) = (&step.action, step.node) {
            if insert.returning.is_some() {
                let key = insert_key(response);
                assigned.insert(node, key);
                outcome.assigned.push((node, key));
            }
        }
    }

    if let Err(err) = driver.exec(schema, Transaction::Commit.into()).await {
        let _ = driver.exec(schema, Transaction::Rollback.into()).await;

        return Err(Error::transaction_failure(plan.len(), "commit", err));
    }

    Ok(outcome)
}

/// Turns a plan step into the driver operation it performs, resolving
/// key references against the inserts that have already run.
fn realize(step: &WriteStep, assigned: &HashMap<NodeId, i64>) -> Operation {
    match &step.action {
        WriteAction::Insert(insert) => Insert {
            table: insert.table,
            rows: vec![insert
                .values
                .iter()
                .map(|expr| realize_expr(expr, assigned))
                .collect()],
            returning: insert.returning.clone(),
        }
        .into(),
        WriteAction::Update(update) => UpdateByKey {
            table: update.table,
            key: realize_expr(&update.key, assigned),
            assignments: update
                .assignments
                .iter()
                .map(|(column, expr)| (*column, realize_expr(expr, assigned)))
                .collect(),
        }
        .into(),
        WriteAction::Delete(delete) => DeleteByKey {
            table: delete.table,
            keys: vec![realize_expr(&delete.key, assigned)],
        }
        .into(),
    }
}

/// Resolves a plan expression to a concrete value.
///
/// # Panics
///
/// Panics if a referenced node's insert has not yet run; the planner
/// orders steps so that it always has.
fn realize_expr(expr: &PlanExpr, assigned: &HashMap<NodeId, i64>) -> stmt::Value {
    match expr {
        PlanExpr::Value(value) => value.clone(),
        PlanExpr::KeyOf(node) => match assigned.get(node) {
            Some(key) => (*key).into(),
            None => panic!("plan step references {node:?} before its insert has run"),
        },
    }
}

/// Reads the store-assigned key out of an insert response.
fn insert_key(response: Response) -> i64 {
    response
        .rows
        .into_values()
        .first()
        .and_then(|row| row.0.first())
        .and_then(stmt::Value::as_i64)
        .expect("insert did not return the new key")
}
