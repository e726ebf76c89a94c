//! Atomically replaceable directory handle shared between request handlers.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use super::StaticDirectory;

/// A published snapshot with its version number.
#[derive(Debug, Clone)]
pub struct PublishedDirectory {
    pub version: u64,
    pub directory: Arc<StaticDirectory>,
}

/// Holds the current directory snapshot.
///
/// Readers take a cheap `Arc` clone of the current snapshot and keep using it
/// even if a reload publishes a newer one in the meantime. The lock is only
/// held long enough to clone or swap the `Arc`, never across `.await` points.
#[derive(Debug, Clone)]
pub struct SharedDirectory {
    current: Arc<RwLock<PublishedDirectory>>,
}

impl SharedDirectory {
    pub fn new(directory: StaticDirectory) -> Self {
        Self {
            current: Arc::new(RwLock::new(PublishedDirectory {
                version: 1,
                directory: Arc::new(directory),
            })),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<StaticDirectory> {
        Arc::clone(&self.current.read().directory)
    }

    /// The current snapshot together with its version.
    pub fn published(&self) -> PublishedDirectory {
        self.current.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    /// Publish a new snapshot, returning its version.
    pub fn replace(&self, directory: StaticDirectory) -> u64 {
        let directory = Arc::new(directory);
        let mut current = self.current.write();
        current.version += 1;
        current.directory = directory;

        info!(
            "Published directory version {} ({} authorities from {})",
            current.version,
            current.directory.len(),
            current.directory.source()
        );
        current.version
    }
}
