use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Schedule;
use crate::livescore::DATE_FORMAT;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid json at {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("snapshot key must be 8 digits (YYYYMMDD), got {0:?}")]
pub struct InvalidKey(pub String);

/// Fixed-width date key. Ordering is plain string ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotKey(String);

impl SnapshotKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl FromStr for SnapshotKey {
    type Err = InvalidKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidKey(s.to_owned()))
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub key: SnapshotKey,
    pub schedule: Schedule,
}

/// Greatest key, or `None` for an empty store.
pub fn select_latest<I: IntoIterator<Item = SnapshotKey>>(keys: I) -> Option<SnapshotKey> {
    keys.into_iter().max()
}

/// Canonical schedules keyed by `YYYYMMDD`. "Latest" is the greatest key,
/// which for fixed-width date keys is chronological order.
pub trait SnapshotStore: Send + Sync {
    fn keys(&self) -> Result<Vec<SnapshotKey>, StoreError>;

    fn load(&self, key: &SnapshotKey) -> Result<Option<Schedule>, StoreError>;

    fn save(&self, key: &SnapshotKey, schedule: &Schedule) -> Result<(), StoreError>;

    /// The newest readable snapshot. Never an error: a store that cannot be
    /// listed, or holds nothing readable, is simply not ready yet.
    fn latest(&self) -> Option<Snapshot> {
        let mut keys = match self.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("cannot list snapshots: {e}");
                return None;
            }
        };
        while let Some(key) = select_latest(keys.iter().cloned()) {
            keys.retain(|k| *k != key);
            match self.load(&key) {
                Ok(Some(schedule)) => return Some(Snapshot { key, schedule }),
                Ok(None) => {}
                Err(e) => warn!("skipping unreadable snapshot {key}: {e}"),
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Filesystem store: {dir}/{YYYYMMDD}.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    dir: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &SnapshotKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn keys(&self) -> Result<Vec<SnapshotKey>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Ok(key) = stem.parse::<SnapshotKey>() {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn load(&self, key: &SnapshotKey) -> Result<Option<Schedule>, StoreError> {
        read_json(&self.path_for(key))
    }

    fn save(&self, key: &SnapshotKey, schedule: &Schedule) -> Result<(), StoreError> {
        let path = self.path_for(key);
        write_json(&path, schedule)?;
        debug!("saved snapshot {key} to {}", path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<BTreeMap<SnapshotKey, Schedule>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn keys(&self) -> Result<Vec<SnapshotKey>, StoreError> {
        let guard = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.keys().cloned().collect())
    }

    fn load(&self, key: &SnapshotKey) -> Result<Option<Schedule>, StoreError> {
        let guard = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn save(&self, key: &SnapshotKey, schedule: &Schedule) -> Result<(), StoreError> {
        let mut guard = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.clone(), schedule.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file helpers
// ---------------------------------------------------------------------------

/// Read a JSON file; a missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_owned(),
                source,
            });
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_owned(),
            source,
        })
}

/// Pretty-print `value` to `path` via a sibling temp file and a rename.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_owned(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_owned(),
            source,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).map_err(|source| StoreError::Io {
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, path).map_err(|source| StoreError::Io {
        path: path.to_owned(),
        source,
    })
}
