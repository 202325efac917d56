//! Pipe-delimited text implementation of the Q-table repository.

use std::path::Path;

use crate::{Result, ports::QTableRepository, q_learning::QTable, q_learning::table_file};

/// File-backed repository using the `state|action|value` line format.
///
/// The format is human-readable and diff-friendly, and is the one the
/// agent's own `save_table`/`load_table` use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTableRepository;

impl TextTableRepository {
    pub fn new() -> Self {
        Self
    }
}

impl QTableRepository for TextTableRepository {
    fn save(&self, table: &QTable, path: &Path) -> Result<()> {
        table_file::save(table, path)
    }

    fn load(&self, path: &Path) -> Result<Option<QTable>> {
        table_file::load(path)
    }
}
