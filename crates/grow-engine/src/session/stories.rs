//! Starting, switching, and importing adventures.

use std::path::PathBuf;

use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::info;

use grow_core::{Scene, World};

use super::{CANCELED, GameSession, SessionState, settle};
use crate::console::Console;
use crate::error::{EditResult, EngineError, EngineResult};
use crate::media::MediaIndex;
use crate::prompt::{self, numbered_list, yes_no};
use crate::storage::{LoadedGame, is_valid_name};

/// Name of the scene a new adventure starts in.
pub(super) const START_SCENE: &str = "start";

/// Description of the start scene of a new adventure.
pub(super) const WELCOME: &str = "Welcome to grow! Your world is empty :(. But, you can fill it \
                                  with stuff! To get started, type \":help\"!";

const BAD_NAME: &str = "That is not a valid name.";
const NAME_TAKEN: &str = "That name is already taken. Pick a different name or hit enter.";

const BAD_STATES: &str =
    "There are game states stored in your grow folder which are named improperly:";
const BAD_ADVENTURES: &str =
    "There are adventures stored in your grow folder which are named improperly:";
const ORPHAN_STATES: &str = "There are state files stored in your grow folder which correspond \
                             to adventures which do not exist:";

impl GameSession {
    /// Tidy the grow home, then resume the last adventure or create a new one,
    /// and show the current scene.
    pub fn init(&mut self, console: &mut Console<'_>) -> EngineResult<()> {
        if self.state() == SessionState::AwaitingInput {
            return Err(EngineError::AlreadyStarted);
        }
        self.clean(console)?;

        let resumed = match self.storage.last_adventure()? {
            Some(name) if self.storage.exists(&name) => match self.storage.load(&name) {
                Ok(game) => Some(game),
                Err(err) => {
                    console.say(format!("Error loading last game state: {err}"))?;
                    console.say("Will create new game.")?;
                    None
                }
            },
            _ => None,
        };
        match resumed {
            Some(LoadedGame { world, media }) => {
                info!(adventure = world.name(), "resuming adventure");
                self.world = Some(world);
                self.media = media;
            }
            None => {
                let name = settle(self.ask_story_name(console))?;
                let name = match name {
                    Some(name) => name,
                    None => self.fresh_name()?,
                };
                self.create_story(name)?;
            }
        }
        self.started = true;

        if let Some(current) = self.current_name() {
            self.show_scene(&current, console)?;
        }
        Ok(())
    }

    /// Offer to delete files in the grow home that do not fit its layout.
    pub fn clean(&self, console: &mut Console<'_>) -> EngineResult<()> {
        let report = self.storage.scan()?;
        let storage = &self.storage;
        offer_removal(console, BAD_STATES, &report.bad_state_files, |file| {
            storage.remove_state_file(file)
        })?;
        offer_removal(console, BAD_ADVENTURES, &report.bad_adventure_files, |file| {
            storage.remove_adventure_file(file)
        })?;
        offer_removal(console, ORPHAN_STATES, &report.orphan_state_files, |file| {
            storage.remove_state_file(file)
        })
    }

    /// A random `story_XXXXXX` name not yet in use.
    fn fresh_name(&mut self) -> EngineResult<String> {
        loop {
            let suffix: String = (&mut self.rng)
                .sample_iter(Alphanumeric)
                .take(6)
                .map(char::from)
                .collect();
            let name = format!("story_{suffix}");
            if !self.storage.exists(&name) {
                return Ok(name);
            }
        }
    }

    /// Ask for the name of a new adventure. Enter takes a random free name.
    fn ask_story_name(&mut self, console: &mut Console<'_>) -> EditResult<String> {
        let default = self.fresh_name()?;
        console.say(format!(
            "What would you like to name your story (hit enter for {default})?"
        ))?;
        loop {
            let name = prompt::read(console, "", BAD_NAME, |line| {
                (line.is_empty() || is_valid_name(line)).then(|| line.to_string())
            })?;
            if name.is_empty() {
                return Ok(default);
            }
            if !self.storage.exists(&name) {
                return Ok(name);
            }
            console.say(NAME_TAKEN)?;
        }
    }

    /// Make an empty adventure called `name` the running game and save it.
    fn create_story(&mut self, name: String) -> EngineResult<()> {
        let world = World::new(name, Scene::new(START_SCENE, WELCOME));
        self.storage.save(&world)?;
        self.storage.remember(world.name())?;
        info!(adventure = world.name(), "created adventure");
        self.world = Some(world);
        self.media = MediaIndex::default();
        Ok(())
    }

    /// Swap in a loaded game and remember it.
    fn switch_to(
        &mut self,
        game: LoadedGame,
        console: &mut Console<'_>,
    ) -> EngineResult<Option<String>> {
        self.storage.remember(game.world.name())?;
        self.world = Some(game.world);
        self.media = game.media;
        let current = self.current_name();
        if let Some(current) = &current {
            self.show_scene(current, console)?;
        }
        Ok(current)
    }

    // -----------------------------------------------------------------------
    // Built-in commands
    // -----------------------------------------------------------------------

    /// Save, then start a fresh adventure.
    pub(super) fn new_story(
        &mut self,
        console: &mut Console<'_>,
    ) -> EngineResult<Option<String>> {
        self.persist()?;
        let Some(name) = settle(self.ask_story_name(console))? else {
            console.say(CANCELED)?;
            return Ok(self.current_name());
        };
        self.create_story(name)?;
        let current = self.current_name();
        if let Some(current) = &current {
            self.show_scene(current, console)?;
        }
        Ok(current)
    }

    /// Save, then pick another stored adventure.
    pub(super) fn change_story(
        &mut self,
        console: &mut Console<'_>,
    ) -> EngineResult<Option<String>> {
        self.persist()?;
        let names = self.storage.adventure_names()?;
        for (i, name) in names.iter().enumerate() {
            console.say(format!("{:<5} {name}", i + 1))?;
        }
        console.say("")?;
        let number = prompt::read_int(console, "Adventure #:", "Bad story number!", 1, names.len());
        let Some(number) = settle(number)? else {
            console.say(CANCELED)?;
            return Ok(self.current_name());
        };
        match self.storage.load(&names[number - 1]) {
            Ok(game) => self.switch_to(game, console),
            Err(err) => {
                console.say(format!("Error reading adventure: {err}"))?;
                Ok(self.current_name())
            }
        }
    }

    /// Copy an adventure in from a zip file and switch to it.
    pub(super) fn import_story(
        &mut self,
        console: &mut Console<'_>,
    ) -> EngineResult<Option<String>> {
        match settle(self.import_dialog(console))? {
            Some(next) => Ok(next),
            None => {
                console.say(CANCELED)?;
                Ok(self.current_name())
            }
        }
    }

    fn import_dialog(&mut self, console: &mut Console<'_>) -> EditResult<Option<String>> {
        let path = prompt::read(console, "Path to the adventure to import:", "", |line| {
            Some(PathBuf::from(line))
        })?;
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| is_valid_name(stem))
            .map(str::to_string);
        let is_zip = path.extension().is_some_and(|ext| ext == "zip");
        let Some(stem) = stem.filter(|_| is_zip && path.is_file()) else {
            console.say("Bad file!")?;
            return Ok(self.current_name());
        };

        let mut name = stem;
        if self.storage.exists(&name) {
            let suggestion = self.storage.suggest_import_name(&name)?;
            console.say(format!("You already have an adventure called {name}"))?;
            console.say(format!(
                "What would you like to rename the adventure to? (Hit enter for {suggestion})"
            ))?;
            name = loop {
                let answer = prompt::read(console, "", BAD_NAME, |line| {
                    (line.is_empty() || is_valid_name(line)).then(|| line.to_string())
                })?;
                if answer.is_empty() {
                    break suggestion;
                }
                if !self.storage.exists(&answer) {
                    break answer;
                }
                console.say(NAME_TAKEN)?;
            };
        }

        self.persist()?;
        if let Err(err) = self.storage.import(&path, &name) {
            console.say(format!("Error importing adventure: {err}"))?;
            return Ok(self.current_name());
        }
        let mut game = self.storage.load(&name)?;
        game.world.set_name(name);
        self.storage.save(&game.world)?;
        console.say("Imported adventure!")?;
        Ok(self.switch_to(game, console)?)
    }
}

/// List `files` under `header` and delete them if the player agrees.
fn offer_removal(
    console: &mut Console<'_>,
    header: &str,
    files: &[String],
    remove: impl Fn(&str) -> EngineResult<()>,
) -> EngineResult<()> {
    if files.is_empty() {
        return Ok(());
    }
    console.say(header)?;
    console.write(&numbered_list(files, 0))?;
    console.say("Would you like to remove them? (y/n)")?;
    if settle(yes_no(console))? != Some(true) {
        return Ok(());
    }
    for file in files {
        if let Err(err) = remove(file) {
            console.say(format!("Could not remove {file}: {err}"))?;
        }
    }
    Ok(())
}
