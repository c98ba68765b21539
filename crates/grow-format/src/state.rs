use grow_core::{GrowResult, World};

use crate::error::SyntaxError;

const CURRENT: &str = "Current: ";
const SCORE: &str = "Score: ";

/// Where the player is and how they are doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// Name of the current scene.
    pub current: String,
    /// The score.
    pub score: i64,
}

impl GameState {
    /// Capture the state of a running world. `None` once the game is over.
    pub fn of(world: &World) -> Option<Self> {
        Some(Self {
            current: world.current_name()?.to_string(),
            score: world.score(),
        })
    }

    /// Apply this state to a world. The world is unchanged on failure.
    pub fn apply(&self, world: &mut World) -> GrowResult<()> {
        world.set_state(&self.current, self.score)
    }
}

/// Parse a two-line state file.
pub fn parse_state(source: &str) -> Result<GameState, SyntaxError> {
    let mut lines = source.lines();
    let current = field(lines.next(), CURRENT, 1)?;
    let score = field(lines.next(), SCORE, 2)?;
    let score = score
        .trim()
        .parse()
        .map_err(|_| SyntaxError::new(2, format!("Score is not an integer: {score}")))?;
    Ok(GameState {
        current: current.to_string(),
        score,
    })
}

fn field<'a>(line: Option<&'a str>, prefix: &str, line_no: usize) -> Result<&'a str, SyntaxError> {
    let line = line.ok_or_else(|| SyntaxError::new(line_no, "Expected line, but none found."))?;
    let value = line
        .strip_prefix(prefix)
        .ok_or_else(|| SyntaxError::new(line_no, format!("Line does not start with: {prefix}")))?;
    if value.is_empty() {
        return Err(SyntaxError::new(line_no, format!("No data after: {prefix}")));
    }
    Ok(value)
}

/// Serialize a state file.
pub fn write_state(state: &GameState) -> String {
    format!("{CURRENT}{}\n{SCORE}{}\n", state.current, state.score)
}
