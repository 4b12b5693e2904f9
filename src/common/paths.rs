use crate::store::snapshot::STORAGE_KEY;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "OKR_DASHBOARD_DATA_DIR";

const APP_DIR: &str = "okr_dashboard";

/// Locations of the files the application reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the data directory: explicit override, then `OKR_DASHBOARD_DATA_DIR`,
    /// then the platform data dir, then the working directory.
    pub fn resolve(override_dir: Option<&Path>) -> Self {
        if let Some(dir) = override_dir {
            return Self::new(dir);
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Self::new(dir);
            }
        }
        let base = dirs_next::data_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(std::env::temp_dir);
        Self::new(base.join(APP_DIR))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.data_dir.join(format!("{STORAGE_KEY}.json"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("okr_dashboard.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::resolve(Some(dir.path()));
        assert_eq!(paths.data_dir(), dir.path());
        assert_eq!(
            paths.snapshot_file(),
            dir.path().join("okr-kanban-storage.json")
        );
    }
}
