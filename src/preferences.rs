//! Persisted user preferences.
//!
//! [`PreferenceStore`] owns the current [`Preferences`] and writes them back
//! through a [`KeyValueStore`] on every mutation. The blob lives under one
//! fixed key, [`PREFERENCES_KEY`], as JSON.
//!
//! Loading never fails. A missing key, unreadable JSON, or a blob with the
//! wrong shape all produce [`Preferences::default`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::{Preferences, PreferencesPatch};

pub const PREFERENCES_KEY: &str = "newsPreferences";

/// Preference store shared between the aggregator and the front end.
pub type SharedPreferences = Arc<RwLock<PreferenceStore>>;

/// Synchronous string-keyed storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// Volatile storage, for tests and one-shot runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object on disk mapping keys to string values.
///
/// The whole file is rewritten on every `set`. A file that exists but does
/// not parse is treated as empty and replaced on the next write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Storage file is not a JSON object; starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Storage file does not exist yet");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)
            .map_err(|e| Error::Storage(format!("{}: {e}", self.path.display())))
    }
}

/// Current preferences plus the storage they persist to.
pub struct PreferenceStore {
    storage: Box<dyn KeyValueStore>,
    current: Preferences,
}

impl PreferenceStore {
    /// Open the store and load whatever is persisted.
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            storage,
            current: Preferences::default(),
        };
        store.current = store.load();
        store
    }

    pub fn shared(self) -> SharedPreferences {
        Arc::new(RwLock::new(self))
    }

    /// Read and decode the persisted preferences, or the default.
    pub fn load(&self) -> Preferences {
        let raw = match self.storage.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved preferences; using defaults");
                return Preferences::default();
            }
            Err(e) => {
                warn!(error = %e, "Could not read saved preferences; using defaults");
                return Preferences::default();
            }
        };
        match serde_json::from_str::<Preferences>(&raw) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(error = %e, "Saved preferences have the wrong shape; using defaults");
                Preferences::default()
            }
        }
    }

    pub fn get(&self) -> &Preferences {
        &self.current
    }

    /// Replace the keys present in `patch` and persist.
    ///
    /// The in-memory value is updated even when persisting fails.
    pub fn update(&mut self, patch: PreferencesPatch) -> Result<()> {
        patch.apply(&mut self.current);
        self.persist()
    }

    /// Restore the defaults and persist them.
    pub fn reset(&mut self) -> Result<()> {
        self.current = Preferences::default();
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.current)?;
        self.storage.set(PREFERENCES_KEY, json)?;
        info!(
            sources = self.current.sources.len(),
            categories = self.current.categories.len(),
            authors = self.current.authors.len(),
            "Saved preferences"
        );
        Ok(())
    }
}
