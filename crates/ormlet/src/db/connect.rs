use super::{Builder, Db};

use ormlet_core::{Error, Result};
use url::Url;

impl Builder {
    /// Builds the schema and connects to the store named by a URL.
    ///
    /// ```text
    /// let db = Db::builder()
    ///     .register(category)
    ///     .register(question)
    ///     .connect("mem://")
    ///     .await?;
    /// ```
    pub async fn connect(&mut self, url: &str) -> Result<Db> {
        let url = Url::parse(url).map_err(|err| Error::invalid_connection_url(err.to_string()))?;

        match url.scheme() {
            #[cfg(feature = "mem")]
            "mem" => self.build(ormlet_driver_mem::Mem::new()).await,
            #[cfg(not(feature = "mem"))]
            "mem" => Err(Error::invalid_connection_url("`mem` feature not enabled")),
            scheme => Err(Error::invalid_connection_url(format!(
                "unsupported database scheme `{scheme}`"
            ))),
        }
    }
}
