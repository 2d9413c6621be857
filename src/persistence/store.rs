//! Where snapshots live

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PersistError;
use crate::sim::GameKind;

/// Opaque text storage for one snapshot
pub trait SnapshotStore {
    /// Stored text, or None when nothing was saved yet
    fn load(&self) -> Result<Option<String>, PersistError>;

    fn save(&mut self, contents: &str) -> Result<(), PersistError>;

    /// Forget the stored snapshot. Clearing an empty store is not an error.
    fn clear(&mut self) -> Result<(), PersistError>;
}

/// Snapshot kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<game>.json`
    pub fn for_game(dir: &Path, kind: GameKind) -> Self {
        Self::new(dir.join(format!("{kind}.json")))
    }

    /// `<dir>/<game>.scores.json`
    pub fn for_scores(dir: &Path, kind: GameKind) -> Self {
        Self::new(dir.join(format!("{kind}.scores.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, contents: &str) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Saved {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub contents: Option<String>,
    /// Make every save fail, to exercise error paths
    pub fail_saves: bool,
}

impl MemoryStore {
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            fail_saves: false,
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, PersistError> {
        Ok(self.contents.clone())
    }

    fn save(&mut self, contents: &str) -> Result<(), PersistError> {
        if self.fail_saves {
            return Err(io::Error::other("save disabled").into());
        }
        self.contents = Some(contents.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        self.contents = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arcade-sims-store-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_store_lifecycle() {
        let dir = scratch_dir("lifecycle");
        let mut store = FileStore::for_game(&dir, GameKind::Asteroids);
        assert!(store.path().ends_with("asteroids.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save("{\"a\":1}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(!store.tmp_path().exists());

        store.save("{\"a\":2}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"a\":2}"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_scores_path() {
        let store = FileStore::for_scores(Path::new("state"), GameKind::MissileCommand);
        assert_eq!(store.path(), Path::new("state/missile_command.scores.json"));
    }

    #[test]
    fn test_memory_store_failure_mode() {
        let mut store = MemoryStore::with_contents("old");
        store.fail_saves = true;
        assert!(store.save("new").is_err());
        assert_eq!(store.load().unwrap().as_deref(), Some("old"));
    }
}
