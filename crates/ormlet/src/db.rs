mod builder;
pub use builder::Builder;

mod connect;

use crate::engine;
use crate::plan::Plan;

use ormlet_core::{
    driver::Driver,
    schema::app::{self, ModelId},
    stmt::Filter,
    Entity, EntityGraph, Error, NodeId, Result, Schema,
};

use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Db {
    /// Handle to the underlying database driver
    pub(crate) driver: Arc<dyn Driver>,

    /// Schema the client is bound to
    pub(crate) schema: Arc<Schema>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Persists every entity reachable from the given roots.
    ///
    /// Unkeyed entities are inserted, keyed ones updated, and related
    /// entities are included when the relation declares the matching
    /// cascade flag. All writes execute as one atomic unit; on success,
    /// store-assigned keys are written back into the graph.
    pub async fn save(&self, graph: &mut EntityGraph, roots: &[NodeId]) -> Result<()> {
        let plan = engine::planner::plan_save(self, graph, roots).await?;
        let outcome = engine::exec::execute(self, &plan).await?;

        for (node, key) in outcome.assigned {
            graph[node].set_key(key);
        }

        Ok(())
    }

    /// Builds the save plan without executing it.
    pub async fn plan_save(&self, graph: &EntityGraph, roots: &[NodeId]) -> Result<Plan> {
        engine::planner::plan_save(self, graph, roots).await
    }

    /// Deletes the entity and, transitively, every related entity whose
    /// relation declares cascade remove. Join table rows referencing a
    /// deleted entity are always cleaned up.
    pub async fn remove(&self, graph: &mut EntityGraph, root: NodeId) -> Result<()> {
        let plan = engine::planner::plan_remove(self, graph, root).await?;
        engine::exec::execute(self, &plan).await?;

        graph[root].clear_key();
        Ok(())
    }

    /// Builds the delete plan without executing it.
    pub async fn plan_remove(&self, graph: &EntityGraph, root: NodeId) -> Result<Plan> {
        engine::planner::plan_remove(self, graph, root).await
    }

    /// Loads the first entity matching the filter, or `None` when no row
    /// matches. Relations named in `relations` are loaded into the
    /// returned graph; all others are left unloaded.
    pub async fn find_one(
        &self,
        model: impl Into<ModelId>,
        filter: Filter,
        relations: &[&str],
    ) -> Result<Option<(EntityGraph, NodeId)>> {
        engine::resolve::find_one(self, model.into(), filter, relations).await
    }

    /// Like [`Db::find_one`], but absence is an error.
    pub async fn get_one(
        &self,
        model: impl Into<ModelId>,
        filter: Filter,
        relations: &[&str],
    ) -> Result<(EntityGraph, NodeId)> {
        let model = model.into();
        let name = self.schema.app.model(model).name.clone();

        match self.find_one(model, filter.clone(), relations).await? {
            Some(found) => Ok(found),
            None => Err(Error::record_not_found(format!("{name} where {filter}"))),
        }
    }

    /// Creates an empty entity for the model, ready to fill and save.
    pub fn entity(&self, model: impl Into<ModelId>) -> Entity {
        Entity::new(model.into())
    }

    /// Looks up a registered model by name.
    pub fn model(&self, name: &str) -> Result<&app::Model> {
        self.schema
            .app
            .model_by_name(name)
            .ok_or_else(|| Error::msg(format!("unknown model {name}")))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
