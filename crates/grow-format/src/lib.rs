//! Plaintext formats for grow adventures and play state.
//!
//! An adventure file holds the world definition; a state file holds the
//! current scene and score. Both are line oriented and written so that
//! `parse(write(x)) == x`.

/// Adventure file reader and writer.
pub mod adventure;
/// Pretty rendering of syntax errors against their source.
pub mod diagnostics;
/// Error types used throughout the crate.
pub mod error;
/// State file reader and writer.
pub mod state;

pub use adventure::{parse_adventure, parse_rule, write_adventure};
pub use diagnostics::render_syntax_error;
pub use error::{FormatError, FormatResult, SyntaxError};
pub use state::{GameState, parse_state, write_state};

use grow_core::World;

/// Parse an adventure and, if given, apply a state file on top of it.
pub fn parse_game(adventure: &str, state: Option<&str>) -> FormatResult<World> {
    let mut world = parse_adventure(adventure)?;
    if let Some(state) = state {
        parse_state(state)?.apply(&mut world)?;
    }
    Ok(world)
}
