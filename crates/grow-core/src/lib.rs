//! Core types for grow: actions, rules, scenes, and the world model.
//!
//! This crate defines the data model that adventure files parse into and
//! that the turn engine mutates. It has no knowledge of files, archives or
//! consoles; you can build a [`World`] programmatically and drive it directly.

/// The closed set of actions a rule can trigger, with their text form.
pub mod action;
/// Error types used throughout the crate.
pub mod error;
/// Case-insensitive whole-word pattern sets.
pub mod pattern;
/// Rules pairing a pattern set with an ordered list of actions.
pub mod rule;
/// Scenes: a description plus an ordered rule list.
pub mod scene;
/// The central world model that owns scenes, position and score.
pub mod world;

/// Re-export action types.
pub use action::{Action, ActionParseError};
/// Re-export error types.
pub use error::{GrowError, GrowResult};
/// Re-export the pattern set.
pub use pattern::PatternSet;
/// Re-export the rule type.
pub use rule::Rule;
/// Re-export the scene type.
pub use scene::Scene;
/// Re-export the world model.
pub use world::World;
