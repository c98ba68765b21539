use std::collections::HashMap;

use tracing::debug;

use crate::error::{GrowError, GrowResult};
use crate::scene::Scene;

/// The complete mutable game state.
///
/// Scene names are unique. `start` always names an existing scene, and so
/// does `current` while the game is running. A `current` of `None` means the
/// game is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    name: String,
    scenes: Vec<Scene>,
    start: String,
    current: Option<String>,
    score: i64,

    // Index
    by_name: HashMap<String, usize>,
}

impl World {
    /// Create a world containing only its start scene, positioned there.
    pub fn new(name: impl Into<String>, start: Scene) -> Self {
        let start_name = start.name().to_string();
        let mut world = Self {
            name: name.into(),
            scenes: Vec::new(),
            start: start_name.clone(),
            current: Some(start_name),
            score: 0,
            by_name: HashMap::new(),
        };
        world.insert(start);
        world
    }

    /// Build a world from a list of scenes, positioned at `start`.
    ///
    /// Fails on duplicate scene names or when `start` is not among them.
    pub fn from_scenes(
        name: impl Into<String>,
        start: &str,
        scenes: impl IntoIterator<Item = Scene>,
    ) -> GrowResult<Self> {
        let mut world = Self {
            name: name.into(),
            scenes: Vec::new(),
            start: start.to_string(),
            current: Some(start.to_string()),
            score: 0,
            by_name: HashMap::new(),
        };
        for scene in scenes {
            world.add_scene(scene)?;
        }
        if !world.contains(start) {
            return Err(GrowError::NoSuchScene(start.to_string()));
        }
        Ok(world)
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// The adventure name, also used as the archive key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the adventure.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // -----------------------------------------------------------------------
    // Scenes
    // -----------------------------------------------------------------------

    /// Add a scene. Fails if the name is taken.
    pub fn add_scene(&mut self, scene: Scene) -> GrowResult<()> {
        if self.contains(scene.name()) {
            return Err(GrowError::SceneAlreadyExists(scene.name().to_string()));
        }
        debug!(scene = scene.name(), "adding scene");
        self.insert(scene);
        Ok(())
    }

    fn insert(&mut self, scene: Scene) {
        self.by_name
            .insert(scene.name().to_string(), self.scenes.len());
        self.scenes.push(scene);
    }

    /// Whether a scene with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Look up a scene by name.
    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.by_name.get(name).map(|&i| &self.scenes[i])
    }

    /// Look up a scene by name for editing.
    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        let index = *self.by_name.get(name)?;
        self.scenes.get_mut(index)
    }

    /// All scenes in insertion order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// Number of scenes.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    // -----------------------------------------------------------------------
    // Position and score
    // -----------------------------------------------------------------------

    /// Name of the start scene.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Name of the current scene, or `None` once the game is over.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The current scene, or `None` once the game is over.
    pub fn current(&self) -> Option<&Scene> {
        self.current.as_deref().and_then(|name| self.scene(name))
    }

    /// The current scene for editing.
    pub fn current_mut(&mut self) -> Option<&mut Scene> {
        let index = *self.by_name.get(self.current.as_deref()?)?;
        self.scenes.get_mut(index)
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        self.current.is_none()
    }

    /// Move to a scene. `None` ends the game.
    pub fn move_to(&mut self, next: Option<&str>) -> GrowResult<()> {
        match next {
            Some(name) if !self.contains(name) => Err(GrowError::NoSuchScene(name.to_string())),
            _ => {
                debug!(from = ?self.current, to = ?next, "moving");
                self.current = next.map(str::to_string);
                Ok(())
            }
        }
    }

    /// The current score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Add `delta` to the score, saturating at the integer bounds.
    pub fn add_score(&mut self, delta: i64) {
        self.score = self.score.saturating_add(delta);
    }

    /// Reset the score and return to the start scene.
    pub fn restart(&mut self) {
        self.score = 0;
        self.current = Some(self.start.clone());
    }

    /// Restore play state. The world is untouched if `current` is unknown.
    pub fn set_state(&mut self, current: &str, score: i64) -> GrowResult<()> {
        if !self.contains(current) {
            return Err(GrowError::NoSuchScene(current.to_string()));
        }
        self.current = Some(current.to_string());
        self.score = score;
        Ok(())
    }

    /// Replace this world wholesale with another.
    pub fn load_game(&mut self, other: World) {
        *self = other;
    }
}
