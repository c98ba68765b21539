//! On-disk layout of adventures, play state, and program data.
//!
//! ```text
//! <root>/
//!   adventures/<name>.zip          archive rooted at <name>/
//!       <name>/<name>_world.txt    adventure file
//!       <name>/<scene>.jpeg        optional scene image
//!       <name>/<scene>.<mp3|wav|aac>
//!   state/<name>_state.txt         optional play state
//!   program_data/current_adventure.txt
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use grow_archive::{Archive, ArchiveError, ArchiveStore};
use grow_core::World;
use grow_format::{GameState, parse_adventure, parse_state, write_adventure, write_state};

use crate::error::{EngineError, EngineResult};
use crate::media::{IMAGE_EXTENSION, MediaIndex, is_sound_extension};

const ADVENTURES: &str = "adventures";
const STATES: &str = "state";
const PROGRAM_DATA: &str = "program_data";
const CURRENT_FILE: &str = "current_adventure.txt";
const STATE_SUFFIX: &str = "_state.txt";
const WORLD_SUFFIX: &str = "_world.txt";
const ARCHIVE_SUFFIX: &str = ".zip";

/// A loaded adventure with its media index.
#[derive(Debug, Clone)]
pub struct LoadedGame {
    /// The world, positioned per its state file if one existed.
    pub world: World,
    /// Media found in the archive.
    pub media: MediaIndex,
}

/// Files in the grow home directory that do not fit the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Entries of the state directory not named `<name>_state.txt`.
    pub bad_state_files: Vec<String>,
    /// Entries of the adventures directory not named `<name>.zip`.
    pub bad_adventure_files: Vec<String>,
    /// State files whose adventure does not exist.
    pub orphan_state_files: Vec<String>,
}

impl CleanReport {
    /// Whether everything is in order.
    pub fn is_clean(&self) -> bool {
        self.bad_state_files.is_empty()
            && self.bad_adventure_files.is_empty()
            && self.orphan_state_files.is_empty()
    }
}

/// Reads and writes adventures under a grow home directory.
#[derive(Debug, Clone)]
pub struct SaveManager {
    root: PathBuf,
    archives: ArchiveStore,
}

impl SaveManager {
    /// Use `root` as the grow home, creating its directories.
    pub fn new(root: impl Into<PathBuf>) -> EngineResult<Self> {
        let root = root.into();
        for dir in [ADVENTURES, STATES, PROGRAM_DATA] {
            fs::create_dir_all(root.join(dir))?;
        }
        let archives = ArchiveStore::new(root.join(ADVENTURES));
        Ok(Self { root, archives })
    }

    /// The grow home directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of an adventure's archive.
    pub fn adventure_path(&self, name: &str) -> PathBuf {
        self.archives.path_of(name)
    }

    fn state_dir(&self) -> PathBuf {
        self.root.join(STATES)
    }

    /// Path of an adventure's play state file.
    pub fn state_path(&self, name: &str) -> PathBuf {
        self.state_dir().join(format!("{name}{STATE_SUFFIX}"))
    }

    fn current_file(&self) -> PathBuf {
        self.root.join(PROGRAM_DATA).join(CURRENT_FILE)
    }

    fn world_entry(name: &str) -> String {
        format!("{name}{WORLD_SUFFIX}")
    }

    /// Whether an adventure with this name is stored.
    pub fn exists(&self, name: &str) -> bool {
        self.archives.exists(name)
    }

    /// Names of all stored adventures, sorted.
    pub fn adventure_names(&self) -> EngineResult<Vec<String>> {
        Ok(self.archives.keys()?)
    }

    // -----------------------------------------------------------------------
    // Load and save
    // -----------------------------------------------------------------------

    /// Load an adventure and its play state.
    ///
    /// A missing state file starts the adventure fresh. Any malformed file
    /// fails the whole load.
    pub fn load(&self, name: &str) -> EngineResult<LoadedGame> {
        if !self.exists(name) {
            return Err(EngineError::NoSuchAdventure(name.to_string()));
        }
        let (text, media) = self.archives.with_archive(name, |archive| {
            let text = archive.read_to_string(&[Self::world_entry(name).as_str()])?;
            Ok::<_, EngineError>((text, MediaIndex::scan(archive)))
        })?;
        let mut world = parse_adventure(&text)?;

        let state_path = self.state_path(name);
        if state_path.is_file() {
            let state = parse_state(&fs::read_to_string(&state_path)?)?;
            state.apply(&mut world)?;
        }
        info!(adventure = name, scenes = world.scene_count(), "loaded adventure");
        Ok(LoadedGame { world, media })
    }

    /// Write the adventure into its archive and, while the game is running,
    /// its play state.
    pub fn save(&self, world: &World) -> EngineResult<()> {
        let name = world.name();
        self.archives.with_archive(name, |archive| {
            archive.write(&[Self::world_entry(name).as_str()], write_adventure(world))
        })?;
        if let Some(state) = GameState::of(world) {
            fs::write(self.state_path(name), write_state(&state))?;
        }
        info!(adventure = name, "saved adventure");
        Ok(())
    }

    /// Record `name` as the adventure to resume next time.
    pub fn remember(&self, name: &str) -> EngineResult<()> {
        fs::write(self.current_file(), format!("{name}\n"))?;
        Ok(())
    }

    /// The adventure recorded by [`remember`](Self::remember), if any.
    pub fn last_adventure(&self) -> EngineResult<Option<String>> {
        let path = self.current_file();
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(text
            .lines()
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string))
    }

    // -----------------------------------------------------------------------
    // Import
    // -----------------------------------------------------------------------

    /// Copy an adventure archive from `source` into the store as `name`.
    ///
    /// The source must be a zip whose root holds `<stem>_world.txt` with a
    /// valid adventure. The world entry is renamed to match `name`.
    pub fn import(&self, source: &Path, name: &str) -> EngineResult<()> {
        let invalid = |reason: &str| EngineError::InvalidImport {
            path: source.display().to_string(),
            reason: reason.to_string(),
        };
        if !source.is_file() || source.extension().is_none_or(|ext| ext != "zip") {
            return Err(invalid("not a zip file"));
        }
        if self.exists(name) {
            return Err(invalid("an adventure with that name already exists"));
        }

        let original = self.archives.open_file(source)?;
        let old_entry = Self::world_entry(original.key());
        let text = match original.read_to_string(&[old_entry.as_str()]) {
            Ok(text) => text,
            Err(ArchiveError::NoSuchEntry(_)) => {
                return Err(invalid(&format!("missing {old_entry}")));
            }
            Err(err) => return Err(err.into()),
        };
        parse_adventure(&text)?;

        let new_entry = Self::world_entry(name);
        let copied = self.archives.with_archive(name, |archive| {
            archive.copy_all_from(&original);
            if old_entry != new_entry {
                archive.delete(&[old_entry.as_str()])?;
                archive.write(&[new_entry.as_str()], text)?;
            }
            Ok::<_, ArchiveError>(())
        });
        original.close()?;
        if let Err(err) = copied {
            if let Err(cleanup) = self.archives.remove(name) {
                warn!(adventure = name, error = %cleanup, "could not remove partial import");
            }
            return Err(err.into());
        }
        let stale = self.state_path(name);
        if stale.is_file() {
            fs::remove_file(stale)?;
        }
        info!(adventure = name, source = %source.display(), "imported adventure");
        Ok(())
    }

    /// A free name for an import of `base`, using `_vN` suffixes.
    pub fn suggest_import_name(&self, base: &str) -> EngineResult<String> {
        let existing: HashSet<String> = self.adventure_names()?.into_iter().collect();
        Ok(suggest_name(base, &existing))
    }

    // -----------------------------------------------------------------------
    // Media
    // -----------------------------------------------------------------------

    /// Index the media of a stored adventure.
    pub fn link_media(&self, name: &str) -> EngineResult<MediaIndex> {
        if !self.exists(name) {
            return Ok(MediaIndex::default());
        }
        Ok(self
            .archives
            .with_archive(name, |archive| Ok::<_, ArchiveError>(MediaIndex::scan(archive)))?)
    }

    /// Read the bytes of a media entry.
    pub fn read_media(&self, name: &str, entry: &str) -> EngineResult<Vec<u8>> {
        Ok(self.archives.with_archive(name, |archive| {
            let mut bytes = Vec::new();
            std::io::Read::read_to_end(&mut archive.read(&[entry])?, &mut bytes)?;
            Ok::<_, ArchiveError>(bytes)
        })?)
    }

    /// Store a scene's image.
    pub fn save_image(&self, name: &str, scene: &str, bytes: &[u8]) -> EngineResult<()> {
        let entry = format!("{scene}.{IMAGE_EXTENSION}");
        Ok(self
            .archives
            .with_archive(name, |archive| archive.write(&[entry.as_str()], bytes))?)
    }

    /// Remove a scene's image.
    pub fn clear_image(&self, name: &str, scene: &str) -> EngineResult<()> {
        let entry = format!("{scene}.{IMAGE_EXTENSION}");
        Ok(self
            .archives
            .with_archive(name, |archive| archive.delete(&[entry.as_str()]))?)
    }

    /// Copy a sound file in as a scene's sound, replacing any previous one.
    pub fn save_sound(&self, name: &str, scene: &str, source: &Path) -> EngineResult<()> {
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| is_sound_extension(ext))
            .ok_or_else(|| EngineError::UnsupportedSound(source.display().to_string()))?
            .to_ascii_lowercase();
        let bytes = fs::read(source)?;
        self.archives.with_archive(name, |archive| {
            remove_sounds(archive, scene)?;
            archive.write(&[format!("{scene}.{extension}").as_str()], bytes)
        })?;
        debug!(adventure = name, scene, "saved sound");
        Ok(())
    }

    /// Remove a scene's sound, if it has one.
    pub fn clear_sound(&self, name: &str, scene: &str) -> EngineResult<()> {
        Ok(self
            .archives
            .with_archive(name, |archive| remove_sounds(archive, scene))?)
    }

    // -----------------------------------------------------------------------
    // Housekeeping
    // -----------------------------------------------------------------------

    /// Find files that do not belong in the layout. Hidden files are ignored.
    pub fn scan(&self) -> EngineResult<CleanReport> {
        let states = visible_entries(&self.state_dir())?;
        let adventures = visible_entries(self.archives.dir())?;

        let mut report = CleanReport::default();
        for file in &adventures {
            if !file.ends_with(ARCHIVE_SUFFIX) {
                report.bad_adventure_files.push(file.clone());
            }
        }
        for file in states {
            let archive = file
                .strip_suffix(STATE_SUFFIX)
                .map(|name| format!("{name}{ARCHIVE_SUFFIX}"));
            match archive {
                None => report.bad_state_files.push(file),
                Some(archive) if !adventures.contains(&archive) => {
                    report.orphan_state_files.push(file);
                }
                Some(_) => {}
            }
        }
        Ok(report)
    }

    /// Delete an entry of the state directory.
    pub fn remove_state_file(&self, file: &str) -> EngineResult<()> {
        remove_path(&self.state_dir().join(file))
    }

    /// Delete an entry of the adventures directory.
    pub fn remove_adventure_file(&self, file: &str) -> EngineResult<()> {
        remove_path(&self.archives.dir().join(file))
    }
}

fn remove_sounds(archive: &mut Archive, scene: &str) -> Result<(), ArchiveError> {
    let sounds: Vec<String> = archive
        .list()
        .into_iter()
        .filter(|entry| {
            entry
                .rsplit_once('.')
                .is_some_and(|(stem, ext)| stem == scene && is_sound_extension(ext))
        })
        .collect();
    for entry in sounds {
        archive.delete(&[entry.as_str()])?;
    }
    Ok(())
}

/// Sorted names of the non-hidden entries of a directory.
fn visible_entries(dir: &Path) -> EngineResult<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    Ok(names)
}

fn remove_path(path: &Path) -> EngineResult<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    debug!(path = %path.display(), "removed");
    Ok(())
}

/// First of `base`, `<stem>_v2`, `<stem>_v3`, ... not in `existing`, where a
/// `_vN` suffix already on `base` is continued rather than stacked.
pub fn suggest_name(base: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }
    let (stem, mut version) = match base.rsplit_once("_v") {
        Some((stem, digits))
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            (stem, digits.parse::<u64>().unwrap_or(1))
        }
        _ => (base, 1),
    };
    loop {
        version += 1;
        let candidate = format!("{stem}_v{version}");
        if !existing.contains(&candidate) {
            return candidate;
        }
    }
}

/// Whether `name` can be used as an adventure name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '`') || c.is_control())
}
