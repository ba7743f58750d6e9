// 🗄️ Ledger Store - the JSON file that holds every movement
//
// The file is a pretty-printed JSON array, rewritten whole on every save.
// No cache and no lock: each call re-reads the file, last writer wins.

use crate::error::{LedgerError, Result};
use crate::movement::{new_id, Movement, NewMovement};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Content written when the file is missing or unreadable as JSON
const EMPTY_LEDGER: &str = "[]";

// ============================================================================
// IMPORT MODE
// ============================================================================

/// How `import` treats the uploaded bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Write the bytes first, then validate. A rejected upload leaves the
    /// file overwritten; the next `load` repairs it to an empty ledger.
    #[default]
    Overwrite,
    /// Validate the bytes first and only write them when they parse
    Staged,
}

// ============================================================================
// LEDGER STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
    import_mode: ImportMode,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            import_mode: ImportMode::default(),
        }
    }

    pub fn with_import_mode(mut self, mode: ImportMode) -> Self {
        self.import_mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn import_mode(&self) -> ImportMode {
        self.import_mode
    }

    /// Read every movement from the backing file
    ///
    /// A missing file, or one that is not a JSON array, is reset to `[]`
    /// and read as empty. Records with odd field types are read leniently.
    /// Records without an id (or sharing one) get a fresh id, and the file
    /// is saved so the ids stay stable.
    pub fn load(&self) -> Result<Vec<Movement>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "ledger file missing, creating an empty one");
                self.reset()?;
                return Ok(Vec::new());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                tracing::warn!(path = %self.path.display(), error = %e, "ledger file is not UTF-8, resetting it");
                self.reset()?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        match parse_movements(contents.as_bytes()) {
            Ok(records) => self.with_stable_ids(records),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ledger file is corrupt, resetting it");
                self.reset()?;
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the backing file with the full collection
    pub fn save(&self, records: &[Movement]) -> Result<()> {
        let data = to_pretty_json(records)?;
        write_atomic(&self.path, data.as_bytes())?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "ledger saved");
        Ok(())
    }

    /// Replace the backing file with uploaded bytes and read it back
    ///
    /// Fails with `CorruptInput` when the bytes are not a JSON array of
    /// movements. In `Overwrite` mode the file has already been replaced
    /// by then.
    pub fn import(&self, bytes: &[u8]) -> Result<Vec<Movement>> {
        let records = match self.import_mode {
            ImportMode::Overwrite => {
                write_atomic(&self.path, bytes)?;
                parse_movements(bytes)?
            }
            ImportMode::Staged => {
                let records = parse_movements(bytes)?;
                write_atomic(&self.path, bytes)?;
                records
            }
        };

        tracing::info!(count = records.len(), mode = ?self.import_mode, "ledger imported");
        self.with_stable_ids(records)
    }

    /// Current backing file bytes, verbatim
    pub fn export(&self) -> Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.reset()?;
                Ok(EMPTY_LEDGER.as_bytes().to_vec())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append a new movement (fresh id) and save; returns the whole collection
    pub fn create(&self, request: NewMovement) -> Result<(Movement, Vec<Movement>)> {
        let mut records = self.load()?;
        let movement = Movement::from_request(request);
        records.push(movement.clone());
        self.save(&records)?;
        Ok((movement, records))
    }

    /// Remove the movement with `id` and save; returns the remaining collection
    pub fn delete(&self, id: &str) -> Result<Vec<Movement>> {
        let mut records = self.load()?;
        let index = records
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| LedgerError::NotFound { id: id.to_string() })?;

        records.remove(index);
        self.save(&records)?;
        Ok(records)
    }

    fn reset(&self) -> Result<()> {
        write_atomic(&self.path, EMPTY_LEDGER.as_bytes())?;
        Ok(())
    }

    fn with_stable_ids(&self, mut records: Vec<Movement>) -> Result<Vec<Movement>> {
        if assign_missing_ids(&mut records) > 0 {
            self.save(&records)?;
        }
        Ok(records)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Parse a ledger document
///
/// Only bad JSON syntax or a top level that is not an array is
/// `CorruptInput`. Each object element is read with the lenient field
/// rules of `Movement`; elements that are not objects are skipped.
pub fn parse_movements(bytes: &[u8]) -> Result<Vec<Movement>> {
    let document: Value = serde_json::from_slice(bytes).map_err(LedgerError::CorruptInput)?;

    let Value::Array(items) = document else {
        return Err(LedgerError::CorruptInput(serde::de::Error::custom(
            "se esperaba una lista de movimientos",
        )));
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index, "skipping ledger entry that is not an object");
            continue;
        }
        match serde_json::from_value::<Movement>(item) {
            Ok(movement) => records.push(movement),
            Err(e) => tracing::warn!(index, error = %e, "skipping unreadable ledger entry"),
        }
    }
    Ok(records)
}

/// Give a fresh id to records with an empty or repeated id
///
/// Returns how many ids were assigned.
pub fn assign_missing_ids(records: &mut [Movement]) -> usize {
    let mut seen = HashSet::new();
    let mut assigned = 0;

    for record in records.iter_mut() {
        if record.id.is_empty() || !seen.insert(record.id.clone()) {
            record.id = new_id();
            seen.insert(record.id.clone());
            assigned += 1;
        }
    }

    assigned
}

/// Four-space indented JSON, the layout the data file has always used
fn to_pretty_json(records: &[Movement]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut ser).map_err(LedgerError::Serialize)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write to a fresh temp file next to the target and rename it over it
///
/// Each call gets its own temp file, so concurrent saves never share one.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
