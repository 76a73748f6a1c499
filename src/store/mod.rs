pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use disk::DiskCollection;
use fjall::PartitionCreateOptions;
use memory::MemoryCollection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens the named collection under `data_path/cache` when `persist` is set.
///
/// Falls back to an in-memory collection if persistence is disabled or the
/// on-disk keyspace cannot be opened.
pub fn open_collection(
    name: &str,
    data_path: Option<&Path>,
    persist: bool,
) -> Arc<dyn KeyValueCollection> {
    if persist && let Some(path) = data_path {
        let cache_dir = path.join("cache");
        let opened = fjall::Config::new(&cache_dir)
            .open()
            .and_then(|keyspace| keyspace.open_partition(name, PartitionCreateOptions::default()));
        match opened {
            Ok(partition) => {
                debug!("Opened persistent cache at {}", cache_dir.display());
                return Arc::new(DiskCollection::new(partition));
            }
            Err(e) => warn!(
                error = %e,
                "Could not open persistent cache at {}, using memory",
                cache_dir.display()
            ),
        }
    }
    Arc::new(MemoryCollection::new())
}
