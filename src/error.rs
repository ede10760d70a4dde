use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::schema::COLUMN_COUNT;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to load database {path}: {reason}")]
    Load { path: PathBuf, reason: LoadFailure },

    #[error("Failed to save file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Please load the database first.")]
    NoDatabaseLoaded,

    #[error("Column '{0}' has no database mapping.")]
    UnmappedColumn(String),

    #[error("Column '{0}' is missing in the database.")]
    MissingReferenceColumn(String),

    #[error("Column index {0} is out of range for a {width}-column grid.", width = COLUMN_COUNT)]
    ColumnOutOfRange(usize),
}

/// Why a reference CSV could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("no header row")]
    NoHeaders,

    #[error("line {line} has {found} fields, expected at most {expected}")]
    TooManyFields {
        line: u64,
        found: usize,
        expected: usize,
    },
}

impl Error {
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<LoadFailure>) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: impl Into<io::Error>) -> Self {
        Error::Write {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Errors the operator can fix from the UI (load a file, pick another column).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::NoDatabaseLoaded
                | Error::UnmappedColumn(_)
                | Error::MissingReferenceColumn(_)
                | Error::ColumnOutOfRange(_)
        )
    }
}
