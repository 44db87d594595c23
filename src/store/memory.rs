use crate::core::store::ObjectStore;
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

type Container = HashMap<String, Vec<u8>>;

/// In-memory object store using HashMap and Mutex
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Container>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given containers already present
    pub fn with_containers<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let containers = names
            .into_iter()
            .map(|name| (name.to_string(), Container::new()))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(containers)),
        }
    }

    pub async fn keys(&self, container: &str) -> Vec<String> {
        let store = self.inner.lock().await;
        let mut keys: Vec<String> = store
            .get(container)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, container: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let mut store = self.inner.lock().await;
        let Some(objects) = store.get_mut(container) else {
            bail!("The specified bucket does not exist: {container}");
        };
        debug!("Memory PUT {}/{}", container, key);
        objects.insert(key.to_string(), body);
        Ok(())
    }

    async fn get_object(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let store = self.inner.lock().await;
        let Some(objects) = store.get(container) else {
            bail!("The specified bucket does not exist: {container}");
        };
        Ok(objects.get(key).cloned())
    }

    async fn create_container(&self, name: &str) -> Result<()> {
        let mut store = self.inner.lock().await;
        store.entry(name.to_string()).or_default();
        debug!("Memory container {} ready", name);
        Ok(())
    }
}
