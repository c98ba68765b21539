//! `grow root`: the saved grow home directory.

use std::fs;
use std::path::Path;

use crate::prefs::{self, Preferences};

pub fn set(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("cannot create {}: {e}", dir.display()))?;
    let dir = dir
        .canonicalize()
        .map_err(|e| format!("cannot resolve {}: {e}", dir.display()))?;

    let mut prefs = Preferences::load()?;
    prefs.root = Some(dir.clone());
    prefs.save()?;

    println!("  Root set to {}", dir.display());
    Ok(())
}

pub fn reset() -> Result<(), String> {
    let root = prefs::default_root()?;
    let mut prefs = Preferences::load()?;
    prefs.root = Some(root.clone());
    prefs.save()?;

    println!("  Root reset to {}", root.display());
    Ok(())
}

pub fn show() -> Result<(), String> {
    let root = prefs::resolve_root(None)?;
    println!("{}", root.display());
    Ok(())
}
