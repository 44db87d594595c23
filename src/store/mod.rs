pub mod disk;
pub mod memory;
pub mod s3;

use crate::core::config::{AppConfig, StorageBackend};
use crate::core::store::ObjectStore;
use anyhow::Result;
use disk::DiskStore;
use memory::MemoryStore;
use s3::S3Store;
use tracing::debug;

/// Opens the object store selected by `storage.backend`.
pub async fn open_store(config: &AppConfig) -> Result<Box<dyn ObjectStore>> {
    let store: Box<dyn ObjectStore> = match config.storage.backend {
        StorageBackend::S3 => Box::new(S3Store::from_config(&config.storage).await),
        StorageBackend::Disk => {
            let path = config.default_data_path()?;
            debug!("Opening disk store at {}", path.display());
            Box::new(DiskStore::open(&path)?)
        }
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    };
    Ok(store)
}
