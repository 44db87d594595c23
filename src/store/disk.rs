use crate::core::store::ObjectStore;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PersistMode};
use std::path::Path;
use tracing::debug;

/// Local object store: each container is a fjall partition under one keyspace.
pub struct DiskStore {
    keyspace: Keyspace,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path.join("objects"))
            .open()
            .with_context(|| format!("Failed to open object store at {}", path.display()))?;
        Ok(Self { keyspace })
    }

    fn check_name(name: &str) -> Result<()> {
        let valid = !name.is_empty()
            && name.len() <= 255
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '#' | '$'));
        if !valid {
            bail!("Invalid container name: {name}");
        }
        Ok(())
    }

    fn existing_partition(&self, name: &str) -> Result<fjall::PartitionHandle> {
        Self::check_name(name)?;
        if !self.keyspace.partition_exists(name) {
            bail!("The specified bucket does not exist: {name}");
        }
        Ok(self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())?)
    }
}

#[async_trait]
impl ObjectStore for DiskStore {
    async fn put_object(&self, container: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let partition = self.existing_partition(container)?;
        partition.insert(key, body)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Disk PUT {}/{}", container, key);
        Ok(())
    }

    async fn get_object(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let partition = self.existing_partition(container)?;
        Ok(partition.get(key)?.map(|value| value.to_vec()))
    }

    async fn create_container(&self, name: &str) -> Result<()> {
        Self::check_name(name)?;
        self.keyspace
            .open_partition(name, PartitionCreateOptions::default())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Disk container {} ready", name);
        Ok(())
    }
}
