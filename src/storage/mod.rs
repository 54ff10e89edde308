use std::error::Error as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::StorageOptions;

mod record;

pub use record::{fallback_title, Geometry, NoteId, NoteRecord};

const TMP_EXTENSION: &str = "json.tmp";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading notes file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing notes file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialising notes")]
    Serialize(#[source] serde_json::Error),
    #[error("writing notes file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Never,
    Saved {
        at: OffsetDateTime,
        count: usize,
    },
    Failed {
        at: OffsetDateTime,
        message: String,
    },
}

/// Note records keyed by identifier, mirrored to a JSON array on disk.
#[derive(Debug)]
pub struct NoteStore {
    path: PathBuf,
    indent: usize,
    notes: IndexMap<NoteId, NoteRecord>,
    save_status: SaveStatus,
}

impl NoteStore {
    pub fn new(options: &StorageOptions) -> Self {
        Self {
            path: options.notes_file.clone(),
            indent: options.indent,
            notes: IndexMap::new(),
            save_status: SaveStatus::Never,
        }
    }

    pub fn open(options: &StorageOptions) -> Self {
        let mut store = Self::new(options);
        store.load();
        store
    }

    /// Replaces the in-memory notes with the file contents. Any failure leaves
    /// the store empty.
    pub fn load(&mut self) {
        self.notes.clear();
        match self.read_file() {
            Ok(Some(records)) => {
                for record in records {
                    self.notes.insert(record.id.clone(), record);
                }
                tracing::info!(
                    count = self.notes.len(),
                    path = %self.path.display(),
                    "loaded notes"
                );
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no notes file yet");
            }
            Err(err @ StoreError::Parse { .. }) => {
                tracing::warn!(
                    error = %err,
                    cause = ?err.source(),
                    "could not decode notes file, starting with empty notes"
                );
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    cause = ?err.source(),
                    "error loading notes, starting with empty notes"
                );
            }
        }
    }

    fn read_file(&self) -> Result<Option<Vec<NoteRecord>>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Rewrites the whole file. Failures are logged and remembered, never raised.
    pub fn save(&mut self) {
        let at = OffsetDateTime::now_utc();
        self.save_status = match self.try_save() {
            Ok(count) => {
                tracing::debug!(count, path = %self.path.display(), "saved notes");
                SaveStatus::Saved { at, count }
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    cause = ?err.source(),
                    "error saving notes"
                );
                SaveStatus::Failed {
                    at,
                    message: err.to_string(),
                }
            }
        };
    }

    pub fn try_save(&self) -> Result<usize, StoreError> {
        let records: Vec<&NoteRecord> = self.notes.values().collect();
        let json = self.encode(&records)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let tmp_path = self.path.with_extension(TMP_EXTENSION);
        fs::write(&tmp_path, &json).map_err(|source| StoreError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(records.len())
    }

    fn encode(&self, records: &[&NoteRecord]) -> Result<Vec<u8>, StoreError> {
        let indent = " ".repeat(self.indent);
        let mut buf = Vec::with_capacity(256 * records.len().max(1));
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records
            .serialize(&mut serializer)
            .map_err(StoreError::Serialize)?;
        Ok(buf)
    }

    pub fn upsert(&mut self, record: NoteRecord) -> Option<NoteRecord> {
        self.notes.insert(record.id.clone(), record)
    }

    pub fn remove(&mut self, id: &NoteId) -> Option<NoteRecord> {
        self.notes.shift_remove(id)
    }

    pub fn get(&self, id: &NoteId) -> Option<&NoteRecord> {
        self.notes.get(id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.notes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &NoteRecord> {
        self.notes.values()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> NoteStore {
        NoteStore::new(&StorageOptions::at(dir.path().join("notes.json")))
    }

    fn record(id: &str, content: &str, geometry: Geometry) -> NoteRecord {
        NoteRecord {
            id: NoteId::from(id),
            title: content.lines().next().unwrap_or_default().to_string(),
            content: content.to_string(),
            geometry,
        }
    }

    fn as_map<'a>(records: impl Iterator<Item = &'a NoteRecord>) -> HashMap<NoteId, NoteRecord> {
        records.map(|r| (r.id.clone(), r.clone())).collect()
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp = TempDir::new().expect("tempdir");
        let store = NoteStore::open(&StorageOptions::at(temp.path().join("absent.json")));
        assert!(store.is_empty());
        assert_eq!(store.save_status(), &SaveStatus::Never);
    }

    #[test]
    fn malformed_file_resets_to_empty() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("notes.json");
        fs::write(&path, "[{\"id\": \"a\", \"title\": ")?;
        let mut store = NoteStore::new(&StorageOptions::at(&path));
        store.upsert(record("stale", "stale", Geometry::default()));
        store.load();
        assert!(store.is_empty());

        let err = store.read_file().expect_err("parse failure");
        assert_matches!(err, StoreError::Parse { .. });
        // the malformed file is left untouched
        assert_eq!(fs::read_to_string(&path)?, "[{\"id\": \"a\", \"title\": ");
        Ok(())
    }

    #[test]
    fn wrong_shape_is_a_parse_failure() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("notes.json");
        fs::write(&path, "{\"id\": \"not-an-array\"}")?;
        let store = NoteStore::open(&StorageOptions::at(&path));
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn disk_mirrors_memory_after_mixed_operations() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = store_in(&temp);

        store.upsert(record("a", "alpha", Geometry::new(1, 1, 30, 8)));
        store.save();
        store.upsert(record("b", "beta\nsecond", Geometry::new(5, 3, 40, 12)));
        store.save();
        store.upsert(record("a", "alpha edited", Geometry::new(2, 2, 35, 9)));
        store.save();
        store.remove(&NoteId::from("b"));
        store.save();
        store.upsert(record("c", "<p>gamma</p>", Geometry::new(-3, 0, 20, 6)));
        store.save();

        let mut reloaded = store_in(&temp);
        reloaded.load();
        assert_eq!(as_map(reloaded.records()), as_map(store.records()));
        assert_eq!(reloaded.len(), 2);
        assert_matches!(store.save_status(), SaveStatus::Saved { count: 2, .. });
        Ok(())
    }

    #[test]
    fn saved_file_is_an_indented_json_array() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = store_in(&temp);
        store.upsert(record("a", "alpha", Geometry::new(1, 2, 30, 8)));
        store.save();

        let raw = fs::read_to_string(store.path())?;
        assert!(raw.starts_with("[\n    {\n        \"id\": \"a\""), "{raw}");
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert!(!store.path().with_extension(TMP_EXTENSION).exists());
        Ok(())
    }

    #[test]
    fn duplicate_ids_keep_the_last_record() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("notes.json");
        fs::write(
            &path,
            r#"[{"id": "a", "title": "first", "content": "first"},
                {"id": "a", "title": "second", "content": "second"}]"#,
        )?;
        let store = NoteStore::open(&StorageOptions::at(&path));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&NoteId::from("a")).map(|r| r.title.as_str()), Some("second"));
        Ok(())
    }

    #[test]
    fn write_failure_is_recorded_not_raised() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        // a directory where the file should be makes the rename fail
        let path = temp.path().join("notes.json");
        fs::create_dir_all(path.join("occupied"))?;
        let mut store = NoteStore::new(&StorageOptions::at(&path));
        store.upsert(record("a", "alpha", Geometry::default()));
        store.save();

        assert_matches!(store.save_status(), SaveStatus::Failed { .. });
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
