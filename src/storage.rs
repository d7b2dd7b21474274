use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{ActivityEntry, Goal, Habit, Task, ThemeSettings};
use crate::store::Store;

pub const KEY_TASKS: &str = "tasks";
pub const KEY_HABITS: &str = "habits";
pub const KEY_GOALS: &str = "goals";
pub const KEY_THEME: &str = "theme_settings";
pub const KEY_QUICK_NOTE: &str = "quick_note";
pub const KEY_ACTIVITY_LOG: &str = "activity_log";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// Key-value storage: one JSON document per key under `root`.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Reads one key. A missing key is `Ok(None)`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let raw = match fs::read_to_string(self.key_path(key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Io(err)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.write_atomic(self.key_path(key), value)
    }

    /// Loads every key, falling back to the default for keys that are missing or unreadable.
    pub fn load_store(&self) -> Store {
        Store {
            tasks: self.get_or_default::<Vec<Task>>(KEY_TASKS),
            habits: self.get_or_default::<Vec<Habit>>(KEY_HABITS),
            goals: self.get_or_default::<Vec<Goal>>(KEY_GOALS),
            theme: self.get_or_default::<ThemeSettings>(KEY_THEME).normalized(),
            quick_note: self.get_or_default::<String>(KEY_QUICK_NOTE),
            activity_log: self.get_or_default::<Vec<ActivityEntry>>(KEY_ACTIVITY_LOG),
        }
    }

    /// Writes the whole store, one key at a time.
    pub fn save_store(&self, store: &Store) -> Result<(), StorageError> {
        self.set(KEY_TASKS, &store.tasks)?;
        self.set(KEY_HABITS, &store.habits)?;
        self.set(KEY_GOALS, &store.goals)?;
        self.set(KEY_THEME, &store.theme)?;
        self.set(KEY_QUICK_NOTE, &store.quick_note)?;
        self.set(KEY_ACTIVITY_LOG, &store.activity_log)?;
        Ok(())
    }

    fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(error) => {
                log::warn!("failed to load key={key}, using default: {error}");
                T::default()
            }
        }
    }

    fn write_atomic<T: Serialize + ?Sized>(
        &self,
        path: PathBuf,
        data: &T,
    ) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}
