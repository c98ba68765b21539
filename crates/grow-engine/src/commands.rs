//! The built-in command table, consulted for lines starting with the command prefix.

use grow_core::{Action, PatternSet};

const HELP: &str = "\
To quit, type \":quit\"
To start over again, type \":restart\"
To save your progress, type \":save\"
To see your score, type \":score\"
To add a rule to this scene, type \":extend\"
To remove a rule from this scene, type \":remove\"
To edit a rule in this scene, type \":edit\"
To change the order of the rules in this scene, type \":reorder\"
To change the description for the current scene, type \":description\"
To cancel an edit, type \":cancel\"
To view all the rules for the current scene, type \":view\"
To open a different adventure, type \":change story\"
To create a new adventure, type \":new\"
To import an adventure from a zip file, type \":import\"";

const EDIT_HELP: &str = "\
To change the patterns of a rule, type \":edit patterns\"
To change the actions of a rule, type \":edit actions\"
To change the order of the actions of a rule, type \":reorder actions\"";

/// What a built-in command does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply an ordinary action.
    Run(Action),
    /// Save the adventure and play state.
    Save,
    /// Save, then switch to another stored adventure.
    ChangeStory,
    /// Save, then start a fresh adventure.
    NewStory,
    /// Import an adventure from a zip file and switch to it.
    Import,
}

/// One entry of the command table.
#[derive(Debug, Clone)]
pub struct BuiltinCommand {
    patterns: PatternSet,
    command: Command,
}

impl BuiltinCommand {
    fn new(pattern: &str, command: Command) -> Self {
        Self {
            patterns: PatternSet::from_iter([pattern]),
            command,
        }
    }

    /// The command run when this entry matches.
    pub fn command(&self) -> &Command {
        &self.command
    }
}

/// The built-in commands in match-priority order.
///
/// Longer phrases come before their prefixes so that `edit patterns` is not
/// taken for `edit`.
pub fn builtin_commands() -> Vec<BuiltinCommand> {
    use Command::{ChangeStory, Import, NewStory, Run, Save};
    vec![
        BuiltinCommand::new("help", Run(Action::Print(HELP.into()))),
        BuiltinCommand::new("quit", Run(Action::Quit)),
        BuiltinCommand::new("restart", Run(Action::Restart)),
        BuiltinCommand::new("change story", ChangeStory),
        BuiltinCommand::new("new", NewStory),
        BuiltinCommand::new("extend", Run(Action::Extend)),
        BuiltinCommand::new("remove", Run(Action::RemoveRule)),
        BuiltinCommand::new("edit patterns", Run(Action::EditPatterns)),
        BuiltinCommand::new("edit actions", Run(Action::EditActions)),
        BuiltinCommand::new("reorder actions", Run(Action::ReorderActions)),
        BuiltinCommand::new("reorder", Run(Action::EditOrder)),
        BuiltinCommand::new("edit", Run(Action::Print(EDIT_HELP.into()))),
        BuiltinCommand::new("description", Run(Action::SetDescription)),
        BuiltinCommand::new("cancel", Run(Action::Print("Nothing to cancel.".into()))),
        BuiltinCommand::new("view", Run(Action::ViewRules)),
        BuiltinCommand::new("score", Run(Action::ScoreDisplay)),
        BuiltinCommand::new("import", Import),
        BuiltinCommand::new("save", Save),
    ]
}

/// The first command whose pattern matches `input`.
pub fn lookup<'a>(table: &'a [BuiltinCommand], input: &str) -> Option<&'a Command> {
    table
        .iter()
        .find(|entry| entry.patterns.matches(input))
        .map(BuiltinCommand::command)
}
