//! Backends holding the serialized snapshot text.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub trait SnapshotStorage: Send {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, text: &str) -> Result<()>;
    /// Move unreadable contents aside. Returns the backup location, if any.
    fn quarantine(&mut self) -> Result<Option<PathBuf>>;
    /// Human readable location for log messages.
    fn describe(&self) -> String;
}

/// Snapshot stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

impl SnapshotStorage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    fn save(&mut self, text: &str) -> Result<()> {
        atomic_write(&self.path, text.as_bytes())
            .with_context(|| format!("writing {}", self.path.display()))
    }

    fn quarantine(&mut self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let backup = self.backup_path();
        fs::rename(&self.path, &backup)
            .with_context(|| format!("moving {} aside", self.path.display()))?;
        Ok(Some(backup))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process storage. Clones share the same slot, so a test can keep one
/// handle and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(text: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(text.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn save(&mut self, text: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        *slot = Some(text.to_string());
        Ok(())
    }

    fn quarantine(&mut self) -> Result<Option<PathBuf>> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
