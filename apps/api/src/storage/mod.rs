//! JSON document store rooted at a data directory — the service's analogue
//! of the browser's fixed localStorage keys. Direct serde_json read/write
//! with cap enforcement on every write; no locking, last writer wins.

pub mod resumes;
pub mod sessions;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    /// Opens (and if needed creates) the data directory.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;
        info!("Document store at {}", data_dir.display());
        Ok(Self { data_dir })
    }

    /// Reads a document list. A missing or corrupt file reads as empty —
    /// the store must never brick the service over one bad write.
    fn read_list<T: DeserializeOwned>(&self, file: &str) -> Vec<T> {
        let path = self.data_dir.join(file);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!("Corrupt document list {}: {e}; treating as empty", path.display());
                Vec::new()
            }
        }
    }

    fn write_list<T: Serialize>(&self, file: &str, items: &[T]) -> Result<()> {
        let path = self.data_dir.join(file);
        let raw = serde_json::to_string_pretty(items)?;
        fs::write(&path, raw)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        n: u32,
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        let docs: Vec<Doc> = store.read_list("nothing.json");
        assert!(docs.is_empty());
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        store.write_list("docs.json", &[Doc { n: 1 }, Doc { n: 2 }]).unwrap();
        let docs: Vec<Doc> = store.read_list("docs.json");
        assert_eq!(docs, vec![Doc { n: 1 }, Doc { n: 2 }]);
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("docs.json"), "{not json").unwrap();
        let docs: Vec<Doc> = store.read_list("docs.json");
        assert!(docs.is_empty());
    }
}
