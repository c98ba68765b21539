//! Actions and their one-line command form.
//!
//! Every action serializes to a single prefix character followed by an
//! optional body. Parsing is the exact inverse of [`Action::to_command_string`].

use std::fmt;
use std::str::FromStr;

/// Something a rule does when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Print a line of text.
    Print(String),
    /// Move to the named scene, creating it interactively if absent.
    Go(String),
    /// Add a (possibly negative) delta to the score.
    ScoreChange(i64),
    /// End the game, reporting the final score.
    Quit,
    /// Reset the score and return to the start scene.
    Restart,
    /// List the rules of the current scene.
    ViewRules,
    /// Report the current score.
    ScoreDisplay,
    /// Interactively add a rule to the current scene.
    Extend,
    /// Interactively remove and add patterns of one rule.
    EditPatterns,
    /// Interactively remove and add actions of one rule.
    EditActions,
    /// Interactively reorder the actions of one rule.
    ReorderActions,
    /// Interactively reorder the rules of the current scene.
    EditOrder,
    /// Interactively replace the description of the current scene.
    SetDescription,
    /// Interactively remove one rule from the current scene.
    RemoveRule,
}

/// Why a line could not be read as an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    /// The line was empty.
    #[error("empty action")]
    Empty,

    /// The prefix was recognized but its body is not allowed.
    #[error("invalid body for '{prefix}': \"{body}\"")]
    InvalidBody {
        /// The prefix character.
        prefix: char,
        /// The rejected body.
        body: String,
    },
}

const PRINT: char = 'p';
const GO: char = 'g';
const SCORE_UP: char = '+';
const SCORE_DOWN: char = '-';
const QUIT: char = 'q';
const RESTART: char = 'r';
const VIEW_RULES: char = 'l';
const SCORE_DISPLAY: char = 's';
const EXTEND: char = 'x';
const EDIT_PATTERNS: char = '~';
const EDIT_ACTIONS: char = '&';
const REORDER_ACTIONS: char = '%';
const EDIT_ORDER: char = '^';
const SET_DESCRIPTION: char = '=';
const REMOVE_RULE: char = '!';

impl Action {
    /// Parse a single action line.
    ///
    /// A line whose first character is not a known prefix is a [`Action::Print`]
    /// of the whole line.
    pub fn parse(line: &str) -> Result<Self, ActionParseError> {
        let Some(prefix) = line.chars().next() else {
            return Err(ActionParseError::Empty);
        };
        let body = &line[prefix.len_utf8()..];
        let invalid = || ActionParseError::InvalidBody {
            prefix,
            body: body.to_string(),
        };

        let parameterless = match prefix {
            PRINT => return Ok(Self::Print(body.to_string())),
            GO if body.is_empty() => return Err(invalid()),
            GO => return Ok(Self::Go(body.to_string())),
            SCORE_UP | SCORE_DOWN => {
                let magnitude = parse_magnitude(body).ok_or_else(invalid)?;
                let delta = if prefix == SCORE_UP {
                    i64::try_from(magnitude).ok()
                } else {
                    0i64.checked_sub_unsigned(magnitude)
                };
                return delta.map(Self::ScoreChange).ok_or_else(invalid);
            }
            QUIT => Self::Quit,
            RESTART => Self::Restart,
            VIEW_RULES => Self::ViewRules,
            SCORE_DISPLAY => Self::ScoreDisplay,
            EXTEND => Self::Extend,
            EDIT_PATTERNS => Self::EditPatterns,
            EDIT_ACTIONS => Self::EditActions,
            REORDER_ACTIONS => Self::ReorderActions,
            EDIT_ORDER => Self::EditOrder,
            SET_DESCRIPTION => Self::SetDescription,
            REMOVE_RULE => Self::RemoveRule,
            _ => return Ok(Self::Print(line.to_string())),
        };

        if body.is_empty() {
            Ok(parameterless)
        } else {
            Err(invalid())
        }
    }

    /// The prefix character this action serializes with.
    pub fn prefix(&self) -> char {
        match self {
            Self::Print(_) => PRINT,
            Self::Go(_) => GO,
            Self::ScoreChange(delta) if *delta < 0 => SCORE_DOWN,
            Self::ScoreChange(_) => SCORE_UP,
            Self::Quit => QUIT,
            Self::Restart => RESTART,
            Self::ViewRules => VIEW_RULES,
            Self::ScoreDisplay => SCORE_DISPLAY,
            Self::Extend => EXTEND,
            Self::EditPatterns => EDIT_PATTERNS,
            Self::EditActions => EDIT_ACTIONS,
            Self::ReorderActions => REORDER_ACTIONS,
            Self::EditOrder => EDIT_ORDER,
            Self::SetDescription => SET_DESCRIPTION,
            Self::RemoveRule => REMOVE_RULE,
        }
    }

    /// The canonical one-line form, e.g. `gcave` or `-5`.
    pub fn to_command_string(&self) -> String {
        self.to_string()
    }

    /// Whether applying this action reads further input lines.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            Self::Extend
                | Self::EditPatterns
                | Self::EditActions
                | Self::ReorderActions
                | Self::EditOrder
                | Self::SetDescription
                | Self::RemoveRule
        )
    }
}

/// A non-negative decimal integer with no sign or whitespace.
fn parse_magnitude(body: &str) -> Option<u64> {
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    body.parse().ok()
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())?;
        match self {
            Self::Print(text) => f.write_str(text),
            Self::Go(scene) => f.write_str(scene),
            Self::ScoreChange(delta) => write!(f, "{}", delta.unsigned_abs()),
            _ => Ok(()),
        }
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
