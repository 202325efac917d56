//! Reset command - Delete the agent's learned table and training ledger

use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::config::StorageArgs;

#[derive(Parser, Debug)]
#[command(about = "Forget everything the agent has learned")]
pub struct ResetArgs {
    #[command(flatten)]
    pub storage: StorageArgs,
}

/// Remove `path`, reporting whether it existed
fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
    }
}

pub fn execute(args: ResetArgs) -> Result<()> {
    for path in [&args.storage.table, &args.storage.ledger] {
        if remove_if_present(path)? {
            println!("Deleted {}", path.display());
        } else {
            println!("Nothing to delete at {}", path.display());
        }
    }
    println!("Agent reset to Beginner level");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_reset_deletes_files_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let table = dir.path().join("qtable.txt");
        let ledger = dir.path().join("ai_stats.dat");
        fs::write(&table, "2_1_0|None|1.5\n").unwrap();
        fs::write(&ledger, "10\n4\n").unwrap();

        let argv = [
            "reset",
            "--table",
            table.to_str().unwrap(),
            "--ledger",
            ledger.to_str().unwrap(),
        ];
        execute(ResetArgs::parse_from(argv)).unwrap();
        assert!(!table.exists());
        assert!(!ledger.exists());

        execute(ResetArgs::parse_from(argv)).unwrap();
    }
}
