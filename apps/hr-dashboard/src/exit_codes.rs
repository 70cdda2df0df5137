//! Process exit codes. Scripts can tell failure classes apart without
//! parsing output.

use ingest::IngestErrorKind;
use products_hr::HrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    /// Ingestion or store failure
    Failure = 1,
    /// Source CSV missing
    NotFound = 2,
    ConfigError = 3,
    /// Write refused by validation or a duplicate key
    Rejected = 4,
}

impl ExitCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn for_hr_error(err: &HrError) -> Self {
        match err {
            HrError::Db(_) => ExitCode::Failure,
            HrError::Validation(_)
            | HrError::DuplicateEmployee(_)
            | HrError::UnknownEmployee(_) => ExitCode::Rejected,
        }
    }
}

impl From<IngestErrorKind> for ExitCode {
    fn from(kind: IngestErrorKind) -> Self {
        match kind {
            IngestErrorKind::NotFound => ExitCode::NotFound,
            IngestErrorKind::Ingestion => ExitCode::Failure,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_u8())
    }
}
