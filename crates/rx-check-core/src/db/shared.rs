//! Process-wide database handle with atomic hot reload.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::info;

use super::{DataResult, DrugDatabase};

/// Shared, hot-reloadable handle to the reference database.
///
/// Readers clone an `Arc` and keep querying their snapshot lock-free; a
/// reload builds a complete new [`DrugDatabase`] off to the side and then
/// publishes it with a single pointer swap. A live instance is never
/// mutated, so no reader can observe a half-updated dataset.
pub struct SharedDatabase {
    inner: RwLock<Arc<DrugDatabase>>,
}

impl SharedDatabase {
    /// Wrap an already-built database.
    pub fn new(db: DrugDatabase) -> Self {
        Self {
            inner: RwLock::new(Arc::new(db)),
        }
    }

    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        Ok(Self::new(DrugDatabase::load(path)?))
    }

    /// Current snapshot. Cheap; holds no lock beyond the Arc clone.
    pub fn current(&self) -> Arc<DrugDatabase> {
        // Only Arc swaps ever happen under this lock, so a poisoned guard
        // still holds a fully consistent value.
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Publish a replacement database.
    pub fn replace(&self, db: DrugDatabase) {
        let db = Arc::new(db);
        match self.inner.write() {
            Ok(mut guard) => *guard = db,
            Err(poisoned) => *poisoned.into_inner() = db,
        }
        info!("drug database replaced");
    }

    /// Rebuild from a path and swap in the result. On failure the previous
    /// instance stays published untouched.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> DataResult<()> {
        let db = DrugDatabase::load(path)?;
        self.replace(db);
        Ok(())
    }
}
