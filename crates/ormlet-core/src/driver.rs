mod response;
pub use response::{Response, Row, Rows};

pub mod operation;
pub use operation::Operation;

use crate::{async_trait, schema::db::Schema, Result};

use std::{fmt::Debug, sync::Arc};

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Register the schema with the driver.
    ///
    /// Called once when the client is built. Registering the same schema
    /// again is a no-op.
    async fn register_schema(&mut self, schema: &Schema) -> Result<()>;

    /// Execute a database operation
    async fn exec(&self, schema: &Arc<Schema>, op: Operation) -> Result<Response>;
}
