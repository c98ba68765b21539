//! Error types for the turn engine.

use thiserror::Error;

use grow_archive::ArchiveError;
use grow_core::GrowError;
use grow_format::{FormatError, SyntaxError};

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while running a game.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A world-model operation failed.
    #[error(transparent)]
    Core(#[from] GrowError),

    /// An adventure or state file was malformed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A game could not be assembled from its files.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// An archive could not be read or written.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Console or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No archive exists for the adventure.
    #[error("no such adventure: {0}")]
    NoSuchAdventure(String),

    /// A file offered for import is not a usable adventure.
    #[error("cannot import {path}: {reason}")]
    InvalidImport {
        /// The offered file.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A sound file has an extension outside the allow-list.
    #[error("unsupported sound file: {0}")]
    UnsupportedSound(String),

    /// Input ended while a line was needed.
    #[error("input closed")]
    InputClosed,

    /// The session has no running game.
    #[error("no game is running")]
    NotStarted,

    /// The session already has a running game.
    #[error("a game is already running")]
    AlreadyStarted,
}

/// Why an interactive dialog stopped before finishing.
#[derive(Debug, Error)]
pub enum Interrupt {
    /// The player typed the cancel command. Nothing was changed.
    #[error("edit cancelled")]
    Cancelled,

    /// Something went wrong.
    #[error(transparent)]
    Failed(#[from] EngineError),
}

/// Result type for interactive dialogs.
pub type EditResult<T> = Result<T, Interrupt>;

impl From<GrowError> for Interrupt {
    fn from(err: GrowError) -> Self {
        Self::Failed(err.into())
    }
}

impl From<std::io::Error> for Interrupt {
    fn from(err: std::io::Error) -> Self {
        Self::Failed(err.into())
    }
}
