use std::fmt;
use std::path::PathBuf;

/// Result type for evalmetrics-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while running an invocation
#[derive(Debug)]
pub enum Error {
    /// The eval log to aggregate does not exist
    MissingInput(PathBuf),

    /// The draft-data folder to archive does not exist
    FolderNotFound(PathBuf),

    /// The report could not be persisted
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Zip encoding failed
    Archive(zip::result::ZipError),

    /// IO operation failed
    Io(std::io::Error),

    /// JSON serialization failed
    Json(serde_json::Error),

    /// Walkdir error
    WalkDir(walkdir::Error),

    /// Configuration file could not be parsed
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingInput(path) => write!(f, "Input file not found: {}", path.display()),
            Error::FolderNotFound(path) => {
                write!(f, "Draft data folder not found: {}", path.display())
            }
            Error::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
            Error::Archive(err) => write!(f, "Archive error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::WalkDir(err) => write!(f, "Directory traversal error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write { source, .. } => Some(source),
            Error::Archive(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::MissingInput(_) | Error::FolderNotFound(_) | Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Archive(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDir(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
