/// Alias for `Result<T, GrowError>`.
pub type GrowResult<T> = Result<T, GrowError>;

/// Errors that can occur when manipulating a world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrowError {
    /// A move or lookup named a scene that does not exist.
    #[error("no such scene: {0}")]
    NoSuchScene(String),

    /// A scene with the same name already exists.
    #[error("scene already exists: {0}")]
    SceneAlreadyExists(String),

    /// An index into a rule, pattern or action list was out of range.
    #[error("index {index} is out of range for a list of {len}")]
    InvalidIndex {
        /// The offending zero-based index.
        index: usize,
        /// The length of the list it was applied to.
        len: usize,
    },

    /// A requested reordering was not a permutation of the list.
    #[error("invalid order: {0}")]
    InvalidOrder(String),
}
