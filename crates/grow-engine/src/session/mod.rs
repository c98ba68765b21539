//! The turn executor.
//!
//! A [`GameSession`] owns the running world and everything needed to play it:
//! the save manager, the media index, the built-in command table, and the
//! RNG used for unknown-input responses and story names.

mod stories;

use std::path::Path;

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use grow_core::{Action, GrowError, Scene, World};

use crate::commands::{BuiltinCommand, Command, builtin_commands, lookup};
use crate::config::EngineConfig;
use crate::console::Console;
use crate::editor;
use crate::error::{EditResult, EngineError, EngineResult, Interrupt};
use crate::media::{MediaIndex, SceneMedia};
use crate::prompt;
use crate::storage::SaveManager;

const CANCELED: &str = "Canceled.";

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// `init` has not run yet.
    NotStarted,
    /// A game is running and waiting for the next line.
    AwaitingInput,
    /// The last game ended. `init` may be called again.
    Terminated,
}

/// What a turn did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The game goes on.
    Continue,
    /// The game ended during this turn.
    Terminated,
}

/// Notified whenever a scene's description is shown.
///
/// Front ends use this to display the scene's image or play its sound.
pub trait SceneObserver {
    /// `scene` of `adventure` was entered.
    fn scene_entered(&mut self, adventure: &str, scene: &Scene, media: Option<&SceneMedia>);
}

/// A game in progress.
pub struct GameSession {
    config: EngineConfig,
    rng: StdRng,
    storage: SaveManager,
    world: Option<World>,
    media: MediaIndex,
    commands: Vec<BuiltinCommand>,
    started: bool,
    observer: Option<Box<dyn SceneObserver>>,
}

impl GameSession {
    /// Create a session over a save manager. Call [`init`](Self::init) to load or create a game.
    pub fn new(config: EngineConfig, storage: SaveManager) -> Self {
        let rng = config.rng();
        Self {
            config,
            rng,
            storage,
            world: None,
            media: MediaIndex::default(),
            commands: builtin_commands(),
            started: false,
            observer: None,
        }
    }

    /// Register the scene observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl SceneObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// The lifecycle state.
    pub fn state(&self) -> SessionState {
        match &self.world {
            Some(world) if !world.is_over() => SessionState::AwaitingInput,
            _ if self.started => SessionState::Terminated,
            _ => SessionState::NotStarted,
        }
    }

    /// The running world, if any.
    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// The save manager.
    pub fn storage(&self) -> &SaveManager {
        &self.storage
    }

    /// Media of the current scene.
    pub fn scene_media(&self) -> Option<&SceneMedia> {
        let scene = self.world.as_ref()?.current_name()?;
        self.media.get(scene)
    }

    // -----------------------------------------------------------------------
    // Turn loop
    // -----------------------------------------------------------------------

    /// Run the game until it ends or input runs out.
    ///
    /// Loads or creates a game first unless one is running. At end of input,
    /// including in the middle of a dialog, the game is saved.
    pub fn play(&mut self, console: &mut Console<'_>) -> EngineResult<()> {
        if self.state() != SessionState::AwaitingInput {
            match self.init(console) {
                Ok(()) => {}
                Err(EngineError::InputClosed) => {
                    self.save_at_end();
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
        loop {
            console.write("> ")?;
            console.flush()?;
            let Some(line) = console.read_line()? else {
                self.save_at_end();
                return Ok(());
            };
            match self.do_turn(&line, console) {
                Ok(TurnOutcome::Continue) => {}
                Ok(TurnOutcome::Terminated) => return Ok(()),
                Err(EngineError::InputClosed) => {
                    self.save_at_end();
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn save_at_end(&self) {
        if self.world.is_none() {
            return;
        }
        if let Err(err) = self.persist() {
            warn!(error = %err, "could not save at end of input");
        }
    }

    /// Dispatch one line of input and apply the resulting actions in order.
    pub fn do_turn(
        &mut self,
        line: &str,
        console: &mut Console<'_>,
    ) -> EngineResult<TurnOutcome> {
        let world = self.world.as_ref().ok_or(EngineError::NotStarted)?;
        if world.is_over() {
            return Ok(TurnOutcome::Terminated);
        }
        let input = line.trim();
        let Some(commands) = self.dispatch(input) else {
            self.say_unknown(console)?;
            return Ok(TurnOutcome::Continue);
        };
        debug!(input, commands = commands.len(), "dispatching");

        for command in commands {
            let next = match self.apply(command, console) {
                Ok(next) => next,
                Err(EngineError::Core(err @ GrowError::NoSuchScene(_))) => {
                    return self.abort(err, console);
                }
                Err(err) if is_recoverable(&err) => {
                    warn!(error = %err, "command failed");
                    console.say(format!("Problem with file: {err}"))?;
                    return Ok(TurnOutcome::Continue);
                }
                Err(err) => return Err(err),
            };
            let Some(next) = next else {
                self.finish();
                return Ok(TurnOutcome::Terminated);
            };
            let world = self.world.as_mut().ok_or(EngineError::NotStarted)?;
            if let Err(err) = world.move_to(Some(&next)) {
                return self.abort(err, console);
            }
        }
        Ok(TurnOutcome::Continue)
    }

    /// The commands for `input`: a built-in command if the line carries the
    /// command prefix and names one, else the current scene's first matching rule.
    fn dispatch(&self, input: &str) -> Option<Vec<Command>> {
        let builtin = input
            .strip_prefix(self.config.command_prefix)
            .and_then(|rest| lookup(&self.commands, rest.trim()));
        if let Some(command) = builtin {
            return Some(vec![command.clone()]);
        }
        let scene = self.world.as_ref()?.current()?;
        let actions = scene.act(input)?;
        Some(actions.iter().cloned().map(Command::Run).collect())
    }

    fn say_unknown(&mut self, console: &mut Console<'_>) -> EngineResult<()> {
        let responses = &self.config.unknown_responses;
        if responses.is_empty() {
            return Ok(());
        }
        let pick = self.rng.random_range(0..responses.len());
        console.say(&responses[pick])
    }

    fn finish(&mut self) {
        if let Some(world) = &self.world {
            info!(adventure = world.name(), score = world.score(), "game over");
        }
        self.world = None;
        self.media = MediaIndex::default();
    }

    /// Give up on a world that tried to move somewhere that does not exist.
    fn abort(&mut self, err: GrowError, console: &mut Console<'_>) -> EngineResult<TurnOutcome> {
        error!(error = %err, "move to a missing scene");
        console.say("Something bad has occurred. Please tell the developer.")?;
        console.say(&err)?;
        self.world = None;
        self.media = MediaIndex::default();
        Ok(TurnOutcome::Terminated)
    }

    // -----------------------------------------------------------------------
    // Applying commands
    // -----------------------------------------------------------------------

    /// Apply one command. Returns the scene to be in afterwards, or `None` to end the game.
    fn apply(
        &mut self,
        command: Command,
        console: &mut Console<'_>,
    ) -> EngineResult<Option<String>> {
        match command {
            Command::Run(action) => self.apply_action(action, console),
            Command::Save => {
                self.persist()?;
                console.say("Game saved.")?;
                Ok(self.current_name())
            }
            Command::ChangeStory => self.change_story(console),
            Command::NewStory => self.new_story(console),
            Command::Import => self.import_story(console),
        }
    }

    fn apply_action(
        &mut self,
        action: Action,
        console: &mut Console<'_>,
    ) -> EngineResult<Option<String>> {
        match action {
            Action::Print(text) => {
                console.say(text)?;
                Ok(self.current_name())
            }
            Action::Go(name) => self.go(name, console),
            Action::ScoreChange(delta) => {
                self.world_mut()?.add_score(delta);
                if delta < 0 {
                    console.say(format!("- {}", delta.unsigned_abs()))?;
                } else {
                    console.say(format!("+ {delta}"))?;
                }
                Ok(self.current_name())
            }
            Action::Quit => {
                if let Err(err) = self.persist() {
                    warn!(error = %err, "could not save on quit");
                    console.say(format!("Error saving: {err}"))?;
                }
                console.say(format!("Score: {}", self.world_ref()?.score()))?;
                Ok(None)
            }
            Action::Restart => {
                let world = self.world_mut()?;
                world.restart();
                let start = world.start().to_string();
                self.go(start, console)
            }
            Action::ViewRules => {
                let world = self.world_ref()?;
                let scene = world.current().ok_or(EngineError::NotStarted)?;
                editor::view_rules(scene, console)?;
                Ok(self.current_name())
            }
            Action::ScoreDisplay => {
                console.say(format!("Your score is: {}", self.world_ref()?.score()))?;
                Ok(self.current_name())
            }
            Action::Extend => self.edit(editor::extend, console),
            Action::EditPatterns => self.edit(editor::edit_patterns, console),
            Action::EditActions => self.edit(editor::edit_actions, console),
            Action::ReorderActions => self.edit(editor::reorder_actions, console),
            Action::EditOrder => self.edit(editor::edit_order, console),
            Action::SetDescription => self.edit(editor::set_description, console),
            Action::RemoveRule => self.edit(editor::remove_rule, console),
        }
    }

    /// Go to `name`, creating it first if it does not exist.
    fn go(&mut self, name: String, console: &mut Console<'_>) -> EngineResult<Option<String>> {
        let world = self.world_mut()?;
        if !world.contains(&name) {
            console.say(format!("Creating new scene: {name}"))?;
            console.say("Description: ")?;
            let description = prompt::read(console, "", "Bad description", |line| {
                (!line.is_empty()).then(|| line.to_string())
            });
            match settle(description)? {
                Some(description) => world.add_scene(Scene::new(name.clone(), description))?,
                None => {
                    console.say(CANCELED)?;
                    return Ok(self.current_name());
                }
            }
        }
        self.show_scene(&name, console)?;
        Ok(Some(name))
    }

    /// Run an editor dialog against the world, then show the current scene again.
    fn edit(
        &mut self,
        dialog: fn(&mut World, &mut Console<'_>) -> EditResult<()>,
        console: &mut Console<'_>,
    ) -> EngineResult<Option<String>> {
        let world = self.world_mut()?;
        match dialog(world, console) {
            Ok(()) => {
                if let Some(current) = self.current_name() {
                    self.show_scene(&current, console)?;
                }
            }
            Err(Interrupt::Cancelled) => console.say(CANCELED)?,
            Err(Interrupt::Failed(EngineError::Core(err))) => {
                warn!(error = %err, "edit failed");
                console.say(&err)?;
            }
            Err(Interrupt::Failed(err)) => return Err(err),
        }
        Ok(self.current_name())
    }

    /// Print a scene's description and tell the observer.
    fn show_scene(&mut self, name: &str, console: &mut Console<'_>) -> EngineResult<()> {
        let world = self.world.as_ref().ok_or(EngineError::NotStarted)?;
        let scene = world
            .scene(name)
            .ok_or_else(|| GrowError::NoSuchScene(name.to_string()))?;
        console.say(scene.description())?;
        if let Some(observer) = self.observer.as_mut() {
            observer.scene_entered(world.name(), scene, self.media.get(name));
        }
        Ok(())
    }

    fn world_ref(&self) -> EngineResult<&World> {
        self.world.as_ref().ok_or(EngineError::NotStarted)
    }

    fn world_mut(&mut self) -> EngineResult<&mut World> {
        self.world.as_mut().ok_or(EngineError::NotStarted)
    }

    fn current_name(&self) -> Option<String> {
        self.world
            .as_ref()
            .and_then(World::current_name)
            .map(str::to_string)
    }

    /// Save the world and remember it as the adventure to resume.
    fn persist(&self) -> EngineResult<()> {
        let world = self.world_ref()?;
        self.storage.save(world)?;
        self.storage.remember(world.name())
    }

    // -----------------------------------------------------------------------
    // Media
    // -----------------------------------------------------------------------

    /// The running adventure and its current scene.
    fn media_target(&self) -> EngineResult<(String, String)> {
        let world = self.world_ref()?;
        let scene = world.current_name().ok_or(EngineError::NotStarted)?;
        Ok((world.name().to_string(), scene.to_string()))
    }

    fn relink_media(&mut self, adventure: &str) -> EngineResult<()> {
        self.media = self.storage.link_media(adventure)?;
        Ok(())
    }

    /// Set the current scene's image.
    pub fn set_scene_image(&mut self, bytes: &[u8]) -> EngineResult<()> {
        let (adventure, scene) = self.media_target()?;
        self.storage.save_image(&adventure, &scene, bytes)?;
        self.relink_media(&adventure)
    }

    /// Remove the current scene's image.
    pub fn clear_scene_image(&mut self) -> EngineResult<()> {
        let (adventure, scene) = self.media_target()?;
        self.storage.clear_image(&adventure, &scene)?;
        self.relink_media(&adventure)
    }

    /// Copy a sound file in as the current scene's sound.
    pub fn set_scene_sound(&mut self, source: &Path) -> EngineResult<()> {
        let (adventure, scene) = self.media_target()?;
        self.storage.save_sound(&adventure, &scene, source)?;
        self.relink_media(&adventure)
    }

    /// Remove the current scene's sound.
    pub fn clear_scene_sound(&mut self) -> EngineResult<()> {
        let (adventure, scene) = self.media_target()?;
        self.storage.clear_sound(&adventure, &scene)?;
        self.relink_media(&adventure)
    }

    /// Read a media entry of the running adventure.
    pub fn read_media(&self, entry: &str) -> EngineResult<Vec<u8>> {
        self.storage.read_media(self.world_ref()?.name(), entry)
    }
}

/// Errors that fail one command but leave the running game usable.
fn is_recoverable(err: &EngineError) -> bool {
    matches!(
        err,
        EngineError::Core(_)
            | EngineError::Syntax(_)
            | EngineError::Format(_)
            | EngineError::Archive(_)
            | EngineError::Io(_)
            | EngineError::NoSuchAdventure(_)
            | EngineError::InvalidImport { .. }
            | EngineError::UnsupportedSound(_)
    )
}

/// Turn a cancelled dialog into `None`.
fn settle<T>(result: EditResult<T>) -> EngineResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Interrupt::Cancelled) => Ok(None),
        Err(Interrupt::Failed(err)) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    use grow_core::{PatternSet, Rule};
    use tempfile::TempDir;

    use super::stories::{START_SCENE, WELCOME};
    use super::*;

    fn rule(pattern: &str, actions: &[&str]) -> Rule {
        Rule::new(
            PatternSet::from_iter([pattern]),
            actions.iter().map(|a| Action::parse(a).unwrap()).collect(),
        )
    }

    fn tale() -> World {
        let start = Scene::new("start", "Welcome")
            .with_rule(rule("north", &["gcave"]))
            .with_rule(rule("quit", &["q"]))
            .with_rule(rule("score", &["+5", "s"]))
            .with_rule(rule("dig", &["gtunnel"]));
        let mut world = World::new("tale", start);
        world
            .add_scene(Scene::new("cave", "A dark cave.").with_rule(rule("south", &["gstart"])))
            .unwrap();
        world
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
            .with_seed(1)
            .with_unknown_responses(["Huh?"])
    }

    fn empty() -> (TempDir, GameSession) {
        let dir = TempDir::new().unwrap();
        let storage = SaveManager::new(dir.path()).unwrap();
        (dir, GameSession::new(config(), storage))
    }

    /// A session whose last adventure is `tale`.
    fn seeded() -> (TempDir, GameSession) {
        let (dir, session) = empty();
        session.storage().save(&tale()).unwrap();
        session.storage().remember("tale").unwrap();
        (dir, session)
    }

    /// Run `f` against a console reading `input`; returns what was printed.
    fn scripted<T>(input: &str, f: impl FnOnce(&mut Console<'_>) -> T) -> (T, String) {
        let mut input = input.as_bytes();
        let mut output = Vec::new();
        let result = {
            let mut console = Console::new(&mut input, &mut output);
            f(&mut console)
        };
        (result, String::from_utf8(output).unwrap())
    }

    fn started() -> (TempDir, GameSession) {
        let (dir, mut session) = seeded();
        let (result, out) = scripted("", |c| session.init(c));
        result.unwrap();
        assert_eq!(out, "Welcome\n");
        (dir, session)
    }

    fn turn(session: &mut GameSession, line: &str, input: &str) -> (TurnOutcome, String) {
        let (result, out) = scripted(input, |c| session.do_turn(line, c));
        (result.unwrap(), out)
    }

    fn current(session: &GameSession) -> Option<&str> {
        session.world().and_then(World::current_name)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn init_resumes_last_adventure() {
        let (_dir, session) = started();
        assert_eq!(session.state(), SessionState::AwaitingInput);
        assert_eq!(session.world().map(World::name), Some("tale"));
    }

    #[test]
    fn init_twice_fails() {
        let (_dir, mut session) = started();
        let (result, _) = scripted("", |c| session.init(c));
        assert!(matches!(result, Err(EngineError::AlreadyStarted)));
    }

    #[test]
    fn turn_before_init_fails() {
        let (_dir, mut session) = seeded();
        assert_eq!(session.state(), SessionState::NotStarted);
        let (result, _) = scripted("", |c| session.do_turn("look", c));
        assert!(matches!(result, Err(EngineError::NotStarted)));
    }

    #[test]
    fn init_creates_named_story() {
        let (_dir, mut session) = empty();
        let (result, out) = scripted("a/b\nmytale\n", |c| session.init(c));
        result.unwrap();
        assert!(out.starts_with("What would you like to name your story (hit enter for story_"));
        assert!(out.contains("That is not a valid name.\n"));
        assert!(out.ends_with(&format!("{WELCOME}\n")));

        let world = session.world().unwrap();
        assert_eq!(world.name(), "mytale");
        assert_eq!(world.current_name(), Some(START_SCENE));
        assert!(session.storage().exists("mytale"));
        assert_eq!(
            session.storage().last_adventure().unwrap().as_deref(),
            Some("mytale")
        );
    }

    #[test]
    fn init_default_name() {
        let (_dir, mut session) = empty();
        let (result, _) = scripted("\n", |c| session.init(c));
        result.unwrap();
        let name = session.world().unwrap().name();
        assert!(name.starts_with("story_"));
        assert_eq!(name.len(), "story_".len() + 6);
    }

    #[test]
    fn init_rejects_taken_name() {
        let (_dir, mut session) = empty();
        session.storage().save(&tale()).unwrap();
        let (result, out) = scripted("tale\nfresh\n", |c| session.init(c));
        result.unwrap();
        assert!(out.contains("That name is already taken. Pick a different name or hit enter.\n"));
        assert_eq!(session.world().unwrap().name(), "fresh");
    }

    #[test]
    fn init_with_broken_state_starts_new_game() {
        let (_dir, mut session) = seeded();
        fs::write(
            session.storage().state_path("tale"),
            "Current: mars\nScore: 1\n",
        )
        .unwrap();
        let (result, out) = scripted("\n", |c| session.init(c));
        result.unwrap();
        assert!(out.starts_with("Error loading last game state: "));
        assert!(out.contains("Will create new game.\n"));
        assert!(session.world().unwrap().name().starts_with("story_"));
    }

    #[test]
    fn init_offers_to_clean() {
        let (dir, mut session) = seeded();
        let junk = dir.path().join("state").join("junk.txt");
        fs::write(&junk, "").unwrap();
        let (result, out) = scripted("y\n", |c| session.init(c));
        result.unwrap();
        assert!(out.starts_with(
            "There are game states stored in your grow folder which are named improperly:\n\
             1.    junk.txt\n\
             Would you like to remove them? (y/n)\n"
        ));
        assert!(!junk.exists());
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_input_keeps_scene() {
        let (_dir, mut session) = started();
        let (outcome, out) = turn(&mut session, "dance", "");
        assert_eq!(outcome, TurnOutcome::Continue);
        assert_eq!(out, "Huh?\n");
        assert_eq!(current(&session), Some("start"));
        // Unknown built-in commands fall through to the scene's rules.
        assert_eq!(turn(&mut session, ":dance", "").1, "Huh?\n");
    }

    #[test]
    fn navigation_prints_description() {
        let (_dir, mut session) = started();
        let (outcome, out) = turn(&mut session, "go NORTH please", "");
        assert_eq!(outcome, TurnOutcome::Continue);
        assert_eq!(out, "A dark cave.\n");
        assert_eq!(current(&session), Some("cave"));
    }

    #[test]
    fn quit_reports_score_and_persists() {
        let (_dir, mut session) = started();
        turn(&mut session, "score", "");
        turn(&mut session, "north", "");
        let (outcome, out) = turn(&mut session, ":quit", "");
        assert_eq!(outcome, TurnOutcome::Terminated);
        assert_eq!(out, "Score: 5\n");
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(session.world().is_none());
        assert_eq!(
            fs::read_to_string(session.storage().state_path("tale")).unwrap(),
            "Current: cave\nScore: 5\n"
        );

        // A new init resumes where the player left off.
        let (result, out) = scripted("", |c| session.init(c));
        result.unwrap();
        assert_eq!(out, "A dark cave.\n");
        assert_eq!(session.world().unwrap().score(), 5);
    }

    #[test]
    fn scene_rule_can_quit() {
        let (_dir, mut session) = started();
        let (outcome, out) = turn(&mut session, "quit", "");
        assert_eq!(outcome, TurnOutcome::Terminated);
        assert_eq!(out, "Score: 0\n");
    }

    #[test]
    fn score_change_and_display() {
        let (_dir, mut session) = started();
        let (_, out) = turn(&mut session, "what is the score", "");
        assert_eq!(out, "+ 5\nYour score is: 5\n");
        assert_eq!(turn(&mut session, ":score", "").1, "Your score is: 5\n");
    }

    #[test]
    fn restart_returns_to_start() {
        let (_dir, mut session) = started();
        turn(&mut session, "score", "");
        turn(&mut session, "north", "");
        let (_, out) = turn(&mut session, ":restart", "");
        assert_eq!(out, "Welcome\n");
        assert_eq!(current(&session), Some("start"));
        assert_eq!(session.world().unwrap().score(), 0);
    }

    #[test]
    fn go_creates_missing_scene() {
        let (_dir, mut session) = started();
        let (_, out) = turn(&mut session, "dig", "\nA narrow tunnel.\n");
        assert_eq!(
            out,
            "Creating new scene: tunnel\nDescription: \nBad description\nA narrow tunnel.\n"
        );
        assert_eq!(current(&session), Some("tunnel"));
    }

    #[test]
    fn go_creation_can_be_cancelled() {
        let (_dir, mut session) = started();
        let (_, out) = turn(&mut session, "dig", ":cancel\n");
        assert!(out.ends_with("Canceled.\n"));
        assert_eq!(current(&session), Some("start"));
        assert!(!session.world().unwrap().contains("tunnel"));
    }

    #[test]
    fn view_lists_rules() {
        let (_dir, mut session) = started();
        let (_, out) = turn(&mut session, ":view", "");
        assert_eq!(
            out,
            "Scene: start\n\
             1     [north] -> [gcave]\n\
             2     [quit] -> [q]\n\
             3     [score] -> [+5`s]\n\
             4     [dig] -> [gtunnel]\n"
        );
    }

    #[test]
    fn help_and_edit_help() {
        let (_dir, mut session) = started();
        assert!(turn(&mut session, ":help", "").1.contains(":extend"));
        assert!(turn(&mut session, ":edit", "").1.contains(":edit patterns"));
        assert_eq!(turn(&mut session, ":cancel", "").1, "Nothing to cancel.\n");
    }

    #[test]
    fn extend_then_use_new_rule() {
        let (_dir, mut session) = started();
        let (_, out) = turn(&mut session, ":extend", "jump\n\npWhee!\n\n");
        assert!(out.ends_with("Extension complete.\nWelcome\n"));
        assert_eq!(turn(&mut session, "jump", "").1, "Whee!\n");
    }

    #[test]
    fn cancelled_edit_changes_nothing() {
        let (_dir, mut session) = started();
        let before = session.world().cloned();
        let (outcome, out) = turn(&mut session, ":extend", "jump\n:cancel\n");
        assert_eq!(outcome, TurnOutcome::Continue);
        assert!(out.ends_with("Canceled.\n"));
        assert_eq!(session.world().cloned(), before);
    }

    #[test]
    fn edit_description_from_rule() {
        let (_dir, mut session) = started();
        turn(&mut session, ":extend", "paint\n\n=\n\n");
        let (_, out) = turn(&mut session, "paint", "Fresh paint.\n");
        assert!(out.ends_with("Description set.\nFresh paint.\n"));
    }

    #[test]
    fn input_closed_mid_dialog_is_an_error() {
        let (_dir, mut session) = started();
        let (result, _) = scripted("jump\n", |c| session.do_turn(":extend", c));
        assert!(matches!(result, Err(EngineError::InputClosed)));
    }

    #[test]
    fn play_saves_when_input_ends_mid_dialog() {
        let (_dir, mut session) = seeded();
        let (result, out) = scripted("north\n:extend\njump\n", |c| session.play(c));
        result.unwrap();
        assert!(out.starts_with("Welcome\n> A dark cave.\n> Patterns to match"));
        assert_eq!(
            fs::read_to_string(session.storage().state_path("tale")).unwrap(),
            "Current: cave\nScore: 0\n"
        );
        let saved = session.storage().load("tale").unwrap();
        assert_eq!(saved.world.scene("cave").unwrap().rules().len(), 1);
    }

    #[test]
    fn failed_save_keeps_the_game_running() {
        let (_dir, mut session) = started();
        turn(&mut session, "north", "");
        let archive = session.storage().adventure_path("tale");
        fs::write(&archive, "not a zip").unwrap();

        let (outcome, out) = turn(&mut session, ":save", "");
        assert_eq!(outcome, TurnOutcome::Continue);
        assert!(out.starts_with("Problem with file: "));
        assert_eq!(out.lines().count(), 1);
        assert_eq!(session.state(), SessionState::AwaitingInput);
        assert_eq!(current(&session), Some("cave"));

        let (outcome, out) = turn(&mut session, ":new", "");
        assert_eq!(outcome, TurnOutcome::Continue);
        assert!(out.starts_with("Problem with file: "));
        assert_eq!(session.world().unwrap().name(), "tale");
    }

    #[test]
    fn play_continues_after_failed_save() {
        let (_dir, mut session) = started();
        let archive = session.storage().adventure_path("tale");
        fs::write(&archive, "not a zip").unwrap();

        let (result, out) = scripted("south\n:save\nnorth\n", |c| session.play(c));
        result.unwrap();
        assert!(out.starts_with("> Huh?\n> Problem with file: "));
        assert!(out.ends_with("> A dark cave.\n> "));
        assert_eq!(current(&session), Some("cave"));
    }

    #[test]
    fn save_command_writes_state() {
        let (_dir, mut session) = started();
        turn(&mut session, "north", "");
        assert_eq!(turn(&mut session, ":save", "").1, "Game saved.\n");
        assert_eq!(
            fs::read_to_string(session.storage().state_path("tale")).unwrap(),
            "Current: cave\nScore: 0\n"
        );
    }

    // -----------------------------------------------------------------------
    // Stories
    // -----------------------------------------------------------------------

    #[test]
    fn new_story_saves_the_old_one() {
        let (_dir, mut session) = started();
        turn(&mut session, "north", "");
        let (_, out) = turn(&mut session, ":new", "second\n");
        assert!(out.ends_with(&format!("{WELCOME}\n")));
        assert_eq!(session.world().unwrap().name(), "second");
        let saved = session.storage().load("tale").unwrap();
        assert_eq!(saved.world.current_name(), Some("cave"));
    }

    #[test]
    fn new_story_can_be_cancelled() {
        let (_dir, mut session) = started();
        let (_, out) = turn(&mut session, ":new", ":cancel\n");
        assert!(out.ends_with("Canceled.\n"));
        assert_eq!(session.world().unwrap().name(), "tale");
    }

    #[test]
    fn change_story_switches_adventure() {
        let (_dir, mut session) = started();
        let other = World::new("other", Scene::new("hut", "A small hut."));
        session.storage().save(&other).unwrap();

        let (_, out) = turn(&mut session, ":change story", "3\n1\n");
        assert_eq!(
            out,
            "1     other\n2     tale\n\nAdventure #:\nBad story number!\nA small hut.\n"
        );
        assert_eq!(session.world().unwrap().name(), "other");
        assert_eq!(
            session.storage().last_adventure().unwrap().as_deref(),
            Some("other")
        );
    }

    #[test]
    fn import_renames_on_collision() {
        let (_dir, mut session) = started();
        let outside = TempDir::new().unwrap();
        let elsewhere = SaveManager::new(outside.path()).unwrap();
        elsewhere
            .save(&World::new("tale", Scene::new("dock", "Imported start.")))
            .unwrap();
        let path = elsewhere.adventure_path("tale");

        let (_, out) = turn(&mut session, ":import", &format!("{}\n\n", path.display()));
        assert_eq!(
            out,
            "Path to the adventure to import:\n\
             You already have an adventure called tale\n\
             What would you like to rename the adventure to? (Hit enter for tale_v2)\n\
             Imported adventure!\n\
             Imported start.\n"
        );
        let world = session.world().unwrap();
        assert_eq!(world.name(), "tale_v2");
        assert_eq!(world.current_name(), Some("dock"));
        assert_eq!(
            session.storage().adventure_names().unwrap(),
            vec!["tale", "tale_v2"]
        );
        assert_eq!(
            session.storage().load("tale_v2").unwrap().world.name(),
            "tale_v2"
        );
    }

    #[test]
    fn import_rejects_missing_file() {
        let (_dir, mut session) = started();
        let (_, out) = turn(&mut session, ":import", "/no/such/story.zip\n");
        assert!(out.ends_with("Bad file!\n"));
        assert_eq!(session.world().unwrap().name(), "tale");
    }

    // -----------------------------------------------------------------------
    // Play loop, observer, media
    // -----------------------------------------------------------------------

    #[test]
    fn play_until_quit() {
        let (_dir, mut session) = seeded();
        let (result, out) = scripted("north\n:quit\nnever read\n", |c| session.play(c));
        result.unwrap();
        assert_eq!(out, "Welcome\n> A dark cave.\n> Score: 0\n");
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn play_saves_at_end_of_input() {
        let (_dir, mut session) = seeded();
        let (result, _) = scripted("north\n", |c| session.play(c));
        result.unwrap();
        assert_eq!(
            fs::read_to_string(session.storage().state_path("tale")).unwrap(),
            "Current: cave\nScore: 0\n"
        );
    }

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl SceneObserver for Recorder {
        fn scene_entered(&mut self, adventure: &str, scene: &Scene, media: Option<&SceneMedia>) {
            let image = media.and_then(|m| m.image.as_deref()).unwrap_or("-");
            self.0
                .borrow_mut()
                .push(format!("{adventure}/{} {image}", scene.name()));
        }
    }

    #[test]
    fn observer_sees_scenes_and_media() {
        let (_dir, mut session) = started();
        let seen = Rc::new(RefCell::new(Vec::new()));
        session.set_observer(Recorder(Rc::clone(&seen)));

        turn(&mut session, "north", "");
        session.set_scene_image(b"jpeg bytes").unwrap();
        assert_eq!(
            session.scene_media().and_then(|m| m.image.as_deref()),
            Some("cave.jpeg")
        );
        assert_eq!(session.read_media("cave.jpeg").unwrap(), b"jpeg bytes");
        turn(&mut session, "south", "");
        turn(&mut session, "north", "");
        assert_eq!(
            *seen.borrow(),
            vec!["tale/cave -", "tale/start -", "tale/cave cave.jpeg"]
        );

        session.clear_scene_image().unwrap();
        assert!(session.scene_media().is_none());
    }

    #[test]
    fn scene_sounds() {
        let (dir, mut session) = started();
        let sound = dir.path().join("wind.wav");
        fs::write(&sound, "whoosh").unwrap();
        session.set_scene_sound(&sound).unwrap();
        assert_eq!(
            session.scene_media().and_then(|m| m.sound.as_deref()),
            Some("start.wav")
        );
        session.clear_scene_sound().unwrap();
        assert!(session.scene_media().is_none());
    }
}
