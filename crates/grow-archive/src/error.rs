use zip::result::ZipError;

/// Alias for `Result<T, ArchiveError>`.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors from archive access.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The requested entry is not in the archive.
    #[error("no such archive entry: {0}")]
    NoSuchEntry(String),

    /// The archive is already open elsewhere.
    #[error("archive already open: {0}")]
    AlreadyOpen(String),

    /// An entry path had an empty segment or a segment containing `/`.
    #[error("invalid entry path: {0}")]
    InvalidPath(String),

    /// Reading or writing the container file failed.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is not a readable zip file.
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),
}
