use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Persistent key-value cache holding JSON values.
pub trait ListCache: Send {
    fn get_item(&self, key: &str) -> Result<Option<Value>>;
    fn set_item(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ListCache for FileCache {
    fn get_item(&self, key: &str) -> Result<Option<Value>> {
        let path = self.item_path(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn set_item(&mut self, key: &str, value: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.item_path(key);
        let contents = serde_json::to_string_pretty(value)?;
        fs::write(&path, contents).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "cache item written");
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    items: HashMap<String, Value>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListCache for MemoryCache {
    fn get_item(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &Value) -> Result<()> {
        self.items.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Older flat storage: a single JSON object mapping keys to JSON-encoded
/// strings.
#[derive(Clone, Debug)]
pub struct LegacyStorage {
    path: PathBuf,
}

impl LegacyStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Option<BTreeMap<String, String>>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.and_then(|mut map| map.remove(key)))
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let Some(mut map) = self.read_map()? else {
            return Ok(());
        };
        if map.remove(key).is_none() {
            return Ok(());
        }
        let contents = serde_json::to_string_pretty(&map)?;
        fs::write(&self.path, contents).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
