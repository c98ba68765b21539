//! Persisted user preferences.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

const CONFIG_DIR_VAR: &str = "GROW_CONFIG_DIR";
const FILE_NAME: &str = "preferences.json";

/// Preferences stored in `preferences.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// The grow home directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

fn home() -> Result<PathBuf, String> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| "HOME is not set".to_string())
}

/// `$HOME/grow`.
pub fn default_root() -> Result<PathBuf, String> {
    Ok(home()?.join("grow"))
}

impl Preferences {
    /// `$GROW_CONFIG_DIR/preferences.json`, or under `$HOME/.config/grow`.
    pub fn path() -> Result<PathBuf, String> {
        let dir = match env::var_os(CONFIG_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => home()?.join(".config").join("grow"),
        };
        Ok(dir.join(FILE_NAME))
    }

    /// Load the preferences. A missing file means defaults.
    pub fn load() -> Result<Self, String> {
        let path = Self::path()?;
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        serde_json::from_str(&text).map_err(|e| format!("invalid {}: {e}", path.display()))
    }

    /// Write the preferences, creating the config directory if needed.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("cannot create {}: {e}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        fs::write(&path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;
        debug!(path = %path.display(), "saved preferences");
        Ok(())
    }
}

/// The grow home to use: `explicit` if given, else the saved root, else
/// [`default_root`], which is then saved.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf, String> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let mut prefs = Preferences::load()?;
    if let Some(root) = &prefs.root {
        return Ok(root.clone());
    }
    let root = default_root()?;
    prefs.root = Some(root.clone());
    prefs.save()?;
    Ok(root)
}
