//! In-memory Q-table repository for testing.
//!
//! This adapter provides a pure in-memory implementation of QTableRepository,
//! enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, ports::QTableRepository, q_learning::QTable};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use teeter::adapters::InMemoryRepository;
/// use teeter::ports::QTableRepository;
/// use teeter::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// repo.save(&QTable::new(), Path::new("agent"))?;
/// assert!(repo.load(Path::new("agent"))?.is_some());
/// assert!(repo.load(Path::new("other"))?.is_none());
/// # Ok::<(), teeter::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<PathBuf, QTable>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<PathBuf, QTable>> {
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of tables currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Clear all stored tables.
    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(path)
    }
}

impl QTableRepository for InMemoryRepository {
    fn save(&self, table: &QTable, path: &Path) -> Result<()> {
        self.storage().insert(path.to_path_buf(), table.clone());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Option<QTable>> {
        Ok(self.storage().get(path).cloned())
    }
}
