use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::archive::Archive;
use crate::error::{ArchiveError, ArchiveResult};

/// File extension of archive containers.
pub const EXTENSION: &str = "zip";

type Registry = Arc<Mutex<HashSet<PathBuf>>>;

/// A directory of `<key>.zip` archives.
///
/// Each container can be open at most once at a time; a second
/// [`open`](Self::open) while the first [`Archive`] is alive fails with
/// [`ArchiveError::AlreadyOpen`].
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    dir: PathBuf,
    open: Registry,
}

impl ArchiveStore {
    /// Manage archives in `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            open: Arc::default(),
        }
    }

    /// The managed directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the container for `key`.
    pub fn path_of(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{EXTENSION}"))
    }

    /// Whether a container for `key` exists on disk.
    pub fn exists(&self, key: &str) -> bool {
        self.path_of(key).is_file()
    }

    /// Keys of every container in the directory, sorted.
    pub fn keys(&self) -> ArchiveResult<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut keys: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Open the archive for `key`, creating an empty one if absent.
    pub fn open(&self, key: &str) -> ArchiveResult<Archive> {
        self.open_at(key, self.path_of(key))
    }

    /// Open an archive stored outside the managed directory, keyed by its file stem.
    pub fn open_file(&self, path: &Path) -> ArchiveResult<Archive> {
        let key = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| ArchiveError::InvalidPath(path.display().to_string()))?;
        self.open_at(key, path.to_path_buf())
    }

    fn open_at(&self, key: &str, path: PathBuf) -> ArchiveResult<Archive> {
        let guard = OpenGuard::acquire(&self.open, key, &path)?;
        debug!(key, path = %path.display(), "opening archive");
        Archive::load(key, path, guard)
    }

    /// Open `key`, run `f`, and close the archive on every exit path.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub fn with_archive<T, E>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Archive) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<ArchiveError>,
    {
        let mut archive = self.open(key)?;
        let result = f(&mut archive);
        let closed = archive.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Delete the container for `key`. Fails if it is open.
    pub fn remove(&self, key: &str) -> ArchiveResult<()> {
        let _guard = OpenGuard::acquire(&self.open, key, &self.path_of(key))?;
        fs::remove_file(self.path_of(key))?;
        debug!(key, "removed archive");
        Ok(())
    }
}

/// Marks a container as open for as long as it lives.
#[derive(Debug)]
pub(crate) struct OpenGuard {
    registry: Registry,
    path: PathBuf,
}

impl OpenGuard {
    fn acquire(registry: &Registry, key: &str, path: &Path) -> ArchiveResult<Self> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let mut open = registry.lock().unwrap_or_else(PoisonError::into_inner);
        if !open.insert(path.clone()) {
            return Err(ArchiveError::AlreadyOpen(key.to_string()));
        }
        Ok(Self {
            registry: Arc::clone(registry),
            path,
        })
    }
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}
