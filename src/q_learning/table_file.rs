//! Pipe-delimited text format for Q-tables
//!
//! One entry per line: `state|action|value`, e.g. `2_1_0|MoveLeft|0.125`.
//! Values are written in Rust's shortest round-trip form so a save/load
//! cycle reproduces every value bit for bit.

use std::{
    fs,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{Error, Result, beam::PlayerAction, q_learning::q_table::QTable, types::StateKey};

const SEPARATOR: char = '|';

/// Outcome of parsing a table file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub table: QTable,
    /// Lines that were neither blank nor a valid entry
    pub skipped_lines: usize,
}

/// Parse one `state|action|value` line
///
/// Returns `None` for anything that is not exactly three fields with a valid
/// key, a known action and a finite value.
pub fn parse_line(line: &str) -> Option<(StateKey, PlayerAction, f64)> {
    let mut fields = line.split(SEPARATOR);
    let state = fields.next()?.trim().parse::<StateKey>().ok()?;
    let action = fields.next()?.trim().parse::<PlayerAction>().ok()?;
    let value = fields.next()?.trim().parse::<f64>().ok()?;
    if fields.next().is_some() || !value.is_finite() {
        return None;
    }
    Some((state, action, value))
}

/// Read a table from any buffered source, skipping malformed lines
///
/// Lines that are not valid UTF-8 count as malformed.
pub fn read_from<R: BufRead>(reader: R) -> Result<ParsedTable> {
    let mut parsed = ParsedTable::default();
    for bytes in reader.split(b'\n') {
        let bytes = bytes.map_err(|source| Error::Io {
            operation: "read Q-table line".to_string(),
            source,
        })?;
        let Ok(line) = std::str::from_utf8(&bytes) else {
            parsed.skipped_lines += 1;
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some((state, action, value)) => parsed.table.set(state, action, value),
            None => parsed.skipped_lines += 1,
        }
    }
    Ok(parsed)
}

/// Write every stored entry, sorted by state then action
pub fn write_to<W: Write>(table: &QTable, mut writer: W) -> io::Result<()> {
    for (state, action, value) in table.entries() {
        writeln!(writer, "{state}{SEPARATOR}{action}{SEPARATOR}{value}")?;
    }
    writer.flush()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save `table` to `path`, creating parent directories as needed
///
/// The table is written to a sibling file first and renamed over `path`, so
/// a failed write leaves any previous table in place.
pub fn save<P: AsRef<Path>>(table: &QTable, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            operation: format!("create directory {}", parent.display()),
            source,
        })?;
    }

    let staging = staging_path(path);
    let written = fs::File::create(&staging)
        .and_then(|file| write_to(table, BufWriter::new(file)))
        .and_then(|()| fs::rename(&staging, path));
    if let Err(source) = written {
        let _ = fs::remove_file(&staging);
        return Err(Error::Io {
            operation: format!("write {}", path.display()),
            source,
        });
    }

    debug!(path = %path.display(), entries = table.size(), "saved Q-table");
    Ok(())
}

/// Load the table stored at `path`
///
/// Returns `Ok(None)` when the file does not exist. Malformed lines are
/// skipped and reported with a warning.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<QTable>> {
    let path = path.as_ref();
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no Q-table file, keeping current table");
            return Ok(None);
        }
        Err(source) => {
            return Err(Error::Io {
                operation: format!("open {}", path.display()),
                source,
            });
        }
    };

    let ParsedTable {
        table,
        skipped_lines,
    } = read_from(BufReader::new(file))?;
    if skipped_lines > 0 {
        warn!(
            path = %path.display(),
            skipped_lines,
            "ignored malformed Q-table lines"
        );
    }
    debug!(path = %path.display(), entries = table.size(), "loaded Q-table");
    Ok(Some(table))
}
