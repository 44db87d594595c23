//! Object storage abstraction for the rate sink

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` at `key`, overwriting any existing object.
    /// Fails if `container` does not exist.
    async fn put_object(&self, container: &str, key: &str, body: Vec<u8>) -> Result<()>;

    async fn get_object(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>>;

    async fn create_container(&self, name: &str) -> Result<()>;
}
