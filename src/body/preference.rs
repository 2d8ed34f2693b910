//! Persisted table-view preference
//!
//! The preference is a single boolean stored as the string `"true"` or
//! `"false"` under [`TABLE_PREFERENCE_KEY`]. Two notification paths keep
//! viewers in sync:
//!
//! - the in-process [`PreferenceBus`], whose messages carry the writer's
//!   [`InstanceId`] so a viewer can skip its own echo
//! - [`StorageEvent`]s reported by the store when another process rewrote it

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::PreferenceError;

/// Store key of the table-view preference
pub const TABLE_PREFERENCE_KEY: &str = "jsonTableEnabled";

/// Key-value string store shared by all viewers of a user profile
pub trait PreferenceStore: Send + Sync {
    /// Check once that the store is usable
    fn probe(&self) -> Result<(), PreferenceError>;

    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;

    /// Changes written by someone else since the last poll
    fn poll_external(&self) -> Vec<StorageEvent> {
        Vec::new()
    }
}

/// Keyed change notification from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
}

/// Read a stored string as a boolean; only `"true"` is true
pub fn parse_bool(value: Option<&str>) -> bool {
    matches!(value, Some("true"))
}

/// Identity of a viewer instance, used as the originator token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Table-view change announced to the other viewers of this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePreferenceChanged {
    pub enabled: bool,
    pub origin: InstanceId,
}

/// In-process broadcast of table-view changes
#[derive(Debug, Clone)]
pub struct PreferenceBus {
    tx: broadcast::Sender<TablePreferenceChanged>,
}

impl PreferenceBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TablePreferenceChanged> {
        self.tx.subscribe()
    }

    /// Publish a change; having no other listeners is fine
    pub fn publish(&self, change: TablePreferenceChanged) {
        let _ = self.tx.send(change);
    }
}

impl Default for PreferenceBus {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values.lock().insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn probe(&self) -> Result<(), PreferenceError> {
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
///
/// Every read goes to the file so the last writer wins across processes.
/// The store remembers what it last saw; [`PreferenceStore::poll_external`]
/// reports the keys that differ from that snapshot. Its own writes update
/// the snapshot and are never reported back.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    seen: Mutex<HashMap<String, String>>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let seen = read_map(&path).unwrap_or_default();
        Self {
            path,
            seen: Mutex::new(seen),
        }
    }

    /// Store at the default location in the user data directory
    pub fn default_location() -> Result<Self, PreferenceError> {
        let dirs = directories::ProjectDirs::from("io", "respview", "respview")
            .ok_or_else(|| PreferenceError::Unavailable("no home directory".into()))?;
        Ok(Self::new(dirs.data_dir().join("preferences.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_map(path: &Path) -> Result<HashMap<String, String>, PreferenceError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let contents = fs::read_to_string(path).map_err(|source| PreferenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    if contents.trim().is_empty() {
        return Ok(HashMap::new());
    }

    serde_json::from_str(&contents).map_err(|e| PreferenceError::ParseError(e.to_string()))
}

fn write_map(path: &Path, map: &HashMap<String, String>) -> Result<(), PreferenceError> {
    let write_err = |source| PreferenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let contents = serde_json::to_string_pretty(map)
        .map_err(|e| PreferenceError::ParseError(e.to_string()))?;

    // Write then rename so readers never see a half-written file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)
}

impl PreferenceStore for FilePreferenceStore {
    fn probe(&self) -> Result<(), PreferenceError> {
        read_map(&self.path)?;

        let dir = self
            .path
            .parent()
            .ok_or_else(|| PreferenceError::Unavailable("preference path has no parent".into()))?;
        fs::create_dir_all(dir).map_err(|source| PreferenceError::WriteError {
            path: dir.to_path_buf(),
            source,
        })?;

        if fs::metadata(dir).map(|m| m.permissions().readonly()).unwrap_or(true) {
            return Err(PreferenceError::Unavailable(format!(
                "{} is not writable",
                dir.display()
            )));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(read_map(&self.path)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut map = read_map(&self.path)?;
        map.insert(key.to_string(), value.to_string());
        write_map(&self.path, &map)?;

        self.seen.lock().insert(key.to_string(), value.to_string());
        tracing::debug!(key, value, path = %self.path.display(), "Preference written");
        Ok(())
    }

    fn poll_external(&self) -> Vec<StorageEvent> {
        let current = match read_map(&self.path) {
            Ok(map) => map,
            Err(e) => {
                tracing::debug!("Skipping preference poll: {}", e);
                return Vec::new();
            }
        };

        let mut seen = self.seen.lock();
        let mut events: Vec<StorageEvent> = current
            .iter()
            .filter(|(key, value)| seen.get(*key) != Some(*value))
            .map(|(key, value)| StorageEvent {
                key: key.clone(),
                new_value: Some(value.clone()),
            })
            .collect();

        events.extend(
            seen.keys()
                .filter(|key| !current.contains_key(*key))
                .map(|key| StorageEvent {
                    key: key.clone(),
                    new_value: None,
                }),
        );

        *seen = current;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("true")));
        assert!(!parse_bool(Some("false")));
        assert!(!parse_bool(Some("TRUE")));
        assert!(!parse_bool(Some("")));
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new().with_value(TABLE_PREFERENCE_KEY, "true");
        assert_eq!(store.get(TABLE_PREFERENCE_KEY).unwrap().as_deref(), Some("true"));
        store.set(TABLE_PREFERENCE_KEY, "false").unwrap();
        assert_eq!(store.get(TABLE_PREFERENCE_KEY).unwrap().as_deref(), Some("false"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");
        let store = FilePreferenceStore::new(&path);

        store.probe().unwrap();
        assert_eq!(store.get(TABLE_PREFERENCE_KEY).unwrap(), None);

        store.set(TABLE_PREFERENCE_KEY, "true").unwrap();
        assert!(path.exists());

        let other = FilePreferenceStore::new(&path);
        assert_eq!(other.get(TABLE_PREFERENCE_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_own_writes_are_not_reported() {
        let dir = tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("preferences.json"));

        store.set(TABLE_PREFERENCE_KEY, "true").unwrap();
        assert!(store.poll_external().is_empty());
    }

    #[test]
    fn test_external_writes_are_reported_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let mine = FilePreferenceStore::new(&path);
        let theirs = FilePreferenceStore::new(&path);

        theirs.set(TABLE_PREFERENCE_KEY, "true").unwrap();

        let events = mine.poll_external();
        assert_eq!(
            events,
            vec![StorageEvent {
                key: TABLE_PREFERENCE_KEY.to_string(),
                new_value: Some("true".to_string()),
            }]
        );
        assert!(mine.poll_external().is_empty());
    }

    #[test]
    fn test_removed_key_reports_no_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let store = FilePreferenceStore::new(&path);
        store.set(TABLE_PREFERENCE_KEY, "true").unwrap();

        std::fs::write(&path, "{}").unwrap();

        let events = store.poll_external();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].new_value, None);
    }

    #[test]
    fn test_corrupt_file_fails_probe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FilePreferenceStore::new(&path);
        assert!(matches!(store.probe(), Err(PreferenceError::ParseError(_))));
    }

    #[test]
    fn test_bus_carries_origin() {
        let bus = PreferenceBus::new();
        let mut rx = bus.subscribe();
        let origin = InstanceId::new();

        bus.publish(TablePreferenceChanged {
            enabled: true,
            origin,
        });

        let change = rx.try_recv().unwrap();
        assert!(change.enabled);
        assert_eq!(change.origin, origin);
    }
}
