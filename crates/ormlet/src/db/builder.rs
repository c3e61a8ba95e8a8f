use super::Db;

use ormlet_core::{
    driver::Driver,
    schema::{self, app},
    Result,
};

use std::sync::Arc;

#[derive(Default)]
pub struct Builder {
    core: schema::Builder,
}

impl Builder {
    /// Registers a model declaration with the schema.
    pub fn register(&mut self, model: app::Model) -> &mut Self {
        self.core.register(model);
        self
    }

    /// Builds the schema, hands it to the driver, and returns the client.
    ///
    /// Registration errors surface here, before any data operation runs.
    pub async fn build(&mut self, mut driver: impl Driver) -> Result<Db> {
        let schema = self.core.build()?;

        driver.register_schema(&schema.db).await?;

        Ok(Db {
            driver: Arc::new(driver),
            schema: Arc::new(schema),
        })
    }
}
