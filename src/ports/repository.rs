//! Repository port for Q-table persistence.
//!
//! This module defines the trait boundary between the domain and infrastructure
//! layers for Q-table storage and retrieval.

use std::path::Path;

use crate::{Result, q_learning::QTable};

/// Port for persisting and loading Q-tables.
///
/// # Examples
///
/// ```no_run
/// use teeter::adapters::TextTableRepository;
/// use teeter::ports::QTableRepository;
/// use teeter::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = TextTableRepository;
/// repo.save(&QTable::new(), Path::new("qtable.txt")).unwrap();
/// ```
pub trait QTableRepository: Send + Sync {
    /// Save a table, replacing anything stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be created or written to.
    fn save(&self, table: &QTable, path: &Path) -> Result<()>;

    /// Load the table stored at `path`.
    ///
    /// Returns `Ok(None)` when nothing is stored there. Malformed entries are
    /// skipped rather than failing the whole load.
    ///
    /// # Errors
    ///
    /// Returns an error if the location exists but cannot be read.
    fn load(&self, path: &Path) -> Result<Option<QTable>>;
}
