use std::fmt;

/// Result type for evalmetrics-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a telemetry candidate is skipped during extraction.
///
/// These never abort a run: the extractor logs them and moves on to the next
/// marker.
#[derive(Debug)]
pub enum Error {
    /// The block after the marker is not valid JSON
    Parse {
        offset: usize,
        source: serde_json::Error,
    },

    /// The block after the marker opens a brace that is never closed
    Unterminated { offset: usize },
}

impl Error {
    /// Byte offset of the opening brace of the rejected block.
    pub fn offset(&self) -> usize {
        match self {
            Error::Parse { offset, .. } | Error::Unterminated { offset } => *offset,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { offset, source } => {
                write!(f, "Malformed JSON block at byte {}: {}", offset, source)
            }
            Error::Unterminated { offset } => {
                write!(f, "Unterminated JSON block at byte {}", offset)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse { source, .. } => Some(source),
            Error::Unterminated { .. } => None,
        }
    }
}
