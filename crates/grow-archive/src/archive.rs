use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{ArchiveError, ArchiveResult};
use crate::store::OpenGuard;

/// An open archive.
///
/// Entries are addressed by path segments relative to the archive root, so
/// `["story_world.txt"]` in the archive `story` is the zip entry
/// `story/story_world.txt`. Entries outside the root are kept as they
/// are but are not visible through this API.
#[derive(Debug)]
pub struct Archive {
    key: String,
    path: PathBuf,
    entries: BTreeMap<String, Vec<u8>>,
    dirty: bool,
    closed: bool,
    _guard: OpenGuard,
}

impl Archive {
    pub(crate) fn load(key: &str, path: PathBuf, guard: OpenGuard) -> ArchiveResult<Self> {
        let mut entries = BTreeMap::new();
        let exists = path.is_file();
        if exists {
            let mut zip = ZipArchive::new(BufReader::new(File::open(&path)?))?;
            for i in 0..zip.len() {
                let mut file = zip.by_index(i)?;
                if file.is_dir() {
                    continue;
                }
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                entries.insert(file.name().to_string(), bytes);
            }
        }
        Ok(Self {
            key: key.to_string(),
            path,
            entries,
            dirty: !exists,
            closed: false,
            _guard: guard,
        })
    }

    /// The archive key; also the name of the root directory inside the zip.
    pub fn key(&self) -> &str {
        &self.key
    }

    fn entry_name(&self, path: &[&str]) -> ArchiveResult<String> {
        if path.is_empty() || path.iter().any(|s| s.is_empty() || s.contains('/')) {
            return Err(ArchiveError::InvalidPath(path.join("/")));
        }
        Ok(format!("{}/{}", self.key, path.join("/")))
    }

    fn root_prefix(&self) -> String {
        format!("{}/", self.key)
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Whether an entry exists.
    pub fn contains(&self, path: &[&str]) -> bool {
        self.entry_name(path)
            .is_ok_and(|name| self.entries.contains_key(&name))
    }

    /// A reader over one entry.
    pub fn read(&self, path: &[&str]) -> ArchiveResult<impl Read + '_> {
        let name = self.entry_name(path)?;
        self.entries
            .get(&name)
            .map(|bytes| Cursor::new(bytes.as_slice()))
            .ok_or(ArchiveError::NoSuchEntry(name))
    }

    /// Read one entry as UTF-8 text.
    pub fn read_to_string(&self, path: &[&str]) -> ArchiveResult<String> {
        let mut text = String::new();
        self.read(path)?.read_to_string(&mut text)?;
        Ok(text)
    }

    /// Every entry under the root, as `/`-joined relative paths in sorted order.
    pub fn list(&self) -> Vec<String> {
        let prefix = self.root_prefix();
        self.entries
            .keys()
            .filter_map(|name| name.strip_prefix(&prefix))
            .map(str::to_string)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    /// A writer that replaces the entry when dropped or committed.
    pub fn writer(&mut self, path: &[&str]) -> ArchiveResult<EntryWriter<'_>> {
        let name = self.entry_name(path)?;
        Ok(EntryWriter {
            archive: self,
            name,
            buffer: Vec::new(),
            committed: false,
        })
    }

    /// Create or replace an entry.
    pub fn write(&mut self, path: &[&str], bytes: impl Into<Vec<u8>>) -> ArchiveResult<()> {
        let name = self.entry_name(path)?;
        self.insert(name, bytes.into());
        Ok(())
    }

    fn insert(&mut self, name: String, bytes: Vec<u8>) {
        debug!(archive = %self.key, entry = %name, len = bytes.len(), "writing entry");
        self.entries.insert(name, bytes);
        self.dirty = true;
    }

    /// Delete an entry.
    pub fn delete(&mut self, path: &[&str]) -> ArchiveResult<()> {
        let name = self.entry_name(path)?;
        if self.entries.remove(&name).is_none() {
            return Err(ArchiveError::NoSuchEntry(name));
        }
        debug!(archive = %self.key, entry = %name, "deleted entry");
        self.dirty = true;
        Ok(())
    }

    /// Copy every entry under `other`'s root into this archive's root,
    /// replacing entries with the same relative path.
    pub fn copy_all_from(&mut self, other: &Archive) {
        let prefix = other.root_prefix();
        let copies: Vec<(String, Vec<u8>)> = other
            .entries
            .iter()
            .filter_map(|(name, bytes)| {
                let relative = name.strip_prefix(&prefix)?;
                Some((format!("{}/{relative}", self.key), bytes.clone()))
            })
            .collect();
        for (name, bytes) in copies {
            self.insert(name, bytes);
        }
    }

    // -----------------------------------------------------------------------
    // Closing
    // -----------------------------------------------------------------------

    /// Write pending changes and release the key.
    pub fn close(mut self) -> ArchiveResult<()> {
        self.closed = true;
        self.flush()
    }

    fn flush(&mut self) -> ArchiveResult<()> {
        if !self.dirty {
            return Ok(());
        }
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        {
            let mut zip = ZipWriter::new(BufWriter::new(temp.as_file_mut()));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            let mut directories = BTreeSet::from([self.root_prefix()]);
            for name in self.entries.keys() {
                let mut end = 0;
                while let Some(i) = name[end..].find('/') {
                    end += i + 1;
                    directories.insert(name[..end].to_string());
                }
            }
            for directory in directories {
                zip.add_directory(directory, options)?;
            }
            for (name, bytes) in &self.entries {
                zip.start_file(name.as_str(), options)?;
                zip.write_all(bytes)?;
            }
            zip.finish()?.flush()?;
        }
        temp.persist(&self.path).map_err(|err| err.error)?;
        self.dirty = false;
        debug!(archive = %self.key, path = %self.path.display(), "archive written");
        Ok(())
    }
}

impl Drop for Archive {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.flush() {
            warn!(archive = %self.key, error = %err, "failed to write archive on drop");
        }
    }
}

/// Buffered writer for one entry. The entry is replaced when the writer is
/// committed or dropped.
#[derive(Debug)]
pub struct EntryWriter<'a> {
    archive: &'a mut Archive,
    name: String,
    buffer: Vec<u8>,
    committed: bool,
}

impl EntryWriter<'_> {
    /// Store the written bytes now.
    pub fn commit(mut self) {
        self.store();
    }

    fn store(&mut self) {
        if !self.committed {
            self.committed = true;
            let bytes = std::mem::take(&mut self.buffer);
            self.archive.insert(std::mem::take(&mut self.name), bytes);
        }
    }
}

impl Write for EntryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EntryWriter<'_> {
    fn drop(&mut self) {
        self.store();
    }
}
