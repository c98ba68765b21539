//! Turn engine for grow.
//!
//! Resolves player input to actions, applies them to the running world, runs
//! the in-game editor dialogs, and saves adventures and play state under a
//! grow home directory.

/// Built-in command table.
pub mod commands;
/// Session configuration.
pub mod config;
/// Line-oriented player I/O.
pub mod console;
/// Interactive scene editing.
pub mod editor;
/// Error types used throughout the crate.
pub mod error;
/// Scene media index.
pub mod media;
/// Prompting helpers for dialogs.
pub mod prompt;
/// The game session and turn loop.
pub mod session;
/// Save management on disk.
pub mod storage;

pub use config::EngineConfig;
pub use console::Console;
pub use error::{EditResult, EngineError, EngineResult, Interrupt};
pub use media::{MediaIndex, SceneMedia};
pub use session::{GameSession, SceneObserver, SessionState, TurnOutcome};
pub use storage::{CleanReport, LoadedGame, SaveManager};
