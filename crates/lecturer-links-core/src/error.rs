use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RewriteError>;

/// Failure to invert URI percent-encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid percent escape at byte {offset}")]
    InvalidEscape { offset: usize },

    #[error("percent-decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("cannot decode link destination {href:?}: {source}")]
    Decode {
        href: String,
        #[source]
        source: DecodeError,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid lecturer table: {0}")]
    InvalidTable(String),
}

impl RewriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
