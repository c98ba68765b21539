use grow_core::GrowError;

/// Alias for `Result<T, FormatError>`.
pub type FormatResult<T> = Result<T, FormatError>;

/// A malformed line in an adventure or state file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax error. Line: {line}. Problem: {reason}")]
pub struct SyntaxError {
    /// One-based line number.
    pub line: usize,
    /// What was wrong with it.
    pub reason: String,
}

impl SyntaxError {
    /// Create a syntax error at a one-based line.
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors from loading a game out of its text files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A file did not follow the grammar.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A well-formed file referred to something the world does not have.
    #[error(transparent)]
    World(#[from] GrowError),
}
