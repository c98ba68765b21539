//! Per-scene images and sounds found in an adventure archive.
//!
//! Media is linked by naming convention: `<scene>.jpeg` is the scene's
//! image and `<scene>.<ext>` for an allowed sound extension is its sound.

use std::collections::HashMap;

use grow_archive::Archive;

/// Extension of scene images.
pub const IMAGE_EXTENSION: &str = "jpeg";

/// Allowed extensions for scene sounds.
pub const SOUND_EXTENSIONS: &[&str] = &["mp3", "wav", "aac"];

/// Archive entries holding one scene's media.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneMedia {
    /// Entry name of the image, if any.
    pub image: Option<String>,
    /// Entry name of the sound, if any.
    pub sound: Option<String>,
}

/// Media for every scene of an adventure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaIndex {
    scenes: HashMap<String, SceneMedia>,
}

impl MediaIndex {
    /// Index the media entries at the top level of an archive.
    pub fn scan(archive: &Archive) -> Self {
        let mut index = Self::default();
        for entry in archive.list() {
            if entry.contains('/') {
                continue;
            }
            let Some((scene, extension)) = entry.rsplit_once('.') else {
                continue;
            };
            let extension = extension.to_ascii_lowercase();
            if extension == IMAGE_EXTENSION {
                index.scenes.entry(scene.to_string()).or_default().image = Some(entry.clone());
            } else if SOUND_EXTENSIONS.contains(&extension.as_str()) {
                index.scenes.entry(scene.to_string()).or_default().sound = Some(entry.clone());
            }
        }
        index
    }

    /// Media for one scene. Scenes without media have none.
    pub fn get(&self, scene: &str) -> Option<&SceneMedia> {
        self.scenes.get(scene)
    }

    /// Number of scenes with at least one media entry.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether no scene has media.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// Whether `extension` is an allowed sound extension.
pub fn is_sound_extension(extension: &str) -> bool {
    SOUND_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
}
