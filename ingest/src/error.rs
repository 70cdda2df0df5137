use std::path::PathBuf;

use platform_db::DbError;
use thiserror::Error;

/// The two failure classes an operator needs to tell apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestErrorKind {
    /// The source file is absent; nothing was written.
    NotFound,
    /// Anything else while reading, cleaning or writing.
    Ingestion,
}

impl IngestErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            IngestErrorKind::NotFound => 2,
            IngestErrorKind::Ingestion => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source file {} not found; check that the CSV export is in place", path.display())]
    NotFound { path: PathBuf },
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column {0} is missing")]
    MissingColumn(&'static str),
    #[error("column {column} must be numeric, found {value:?}")]
    NonNumericColumn { column: String, value: String },
    #[error("columns {first:?} and {second:?} both clean to {name:?}")]
    ColumnCollision {
        name: String,
        first: String,
        second: String,
    },
    #[error("EmployeeID values are not unique: {0}")]
    DuplicateEmployeeId(String),
    #[error("write failed: {0}")]
    Store(#[source] DbError),
    #[error("verification failed: wrote {expected} rows but the table holds {found}")]
    CountMismatch { expected: u64, found: i64 },
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            IngestError::NotFound { .. } => IngestErrorKind::NotFound,
            _ => IngestErrorKind::Ingestion,
        }
    }
}

impl From<DbError> for IngestError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateKey(message) => IngestError::DuplicateEmployeeId(message),
            other => IngestError::Store(other),
        }
    }
}
