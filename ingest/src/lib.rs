//! Turns a raw HR CSV export into the clean, query-ready employee table.
//!
//! The steps run in a fixed order and each assumes the previous ones ran:
//! parse, synthesise `EmployeeID`, drop rows without a `Department`,
//! quarantine rows whose known columns are malformed, fill missing
//! `YearsAtCompany` with the median, sanitise column names, replace the
//! table, then count what landed.

mod cleaning;
mod error;
mod frame;
mod load;

use std::fmt;
use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;

use platform_db::Store;
use serde::Serialize;
use tracing::{info, warn};

pub use cleaning::{QuarantinedRow, median, sanitize_name};
pub use error::{IngestError, IngestErrorKind};
pub use frame::{Cell, Column, ColumnKind, Frame, Row};

const DEFAULT_CSV_PATH: &str = "data/WA_Fn-UseC_-HR-Employee-Attrition.csv";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    pub csv_path: PathBuf,
}

impl IngestConfig {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
        }
    }

    /// Reads `HR_CSV_PATH`, defaulting to the IBM attrition export under `data/`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("HR_CSV_PATH").unwrap_or_else(|_| DEFAULT_CSV_PATH.into()))
    }
}

/// What the cleaning passes did to the source rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Cleaned {
    pub frame: Frame,
    pub rows_read: usize,
    pub synthesized_employee_id: bool,
    pub rows_dropped_missing_department: usize,
    pub quarantined: Vec<QuarantinedRow>,
    pub years_at_company_fill: Option<f64>,
    pub dropped_columns: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IngestReport {
    pub table: String,
    pub rows_read: usize,
    pub synthesized_employee_id: bool,
    pub rows_dropped_missing_department: usize,
    pub rows_quarantined: Vec<QuarantinedRow>,
    pub years_at_company_fill: Option<f64>,
    pub dropped_columns: Vec<String>,
    pub columns: Vec<Column>,
    pub rows_written: i64,
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database setup complete.")?;
        writeln!(f, "  rows read:                 {}", self.rows_read)?;
        writeln!(
            f,
            "  dropped (no Department):   {}",
            self.rows_dropped_missing_department
        )?;
        writeln!(f, "  quarantined:               {}", self.rows_quarantined.len())?;
        for row in &self.rows_quarantined {
            writeln!(
                f,
                "    line {}: {} = {:?} ({})",
                row.line, row.column, row.value, row.reason
            )?;
        }
        match self.years_at_company_fill {
            Some(fill) => writeln!(f, "  YearsAtCompany filled with {fill}")?,
            None => writeln!(f, "  YearsAtCompany: nothing to fill")?,
        }
        if !self.dropped_columns.is_empty() {
            writeln!(f, "  dropped unnamed columns:   {}", self.dropped_columns.join(", "))?;
        }
        write!(
            f,
            "  table {:?}: {} rows, {} columns",
            self.table,
            self.rows_written,
            self.columns.len()
        )
    }
}

/// Runs every cleaning pass over a parsed frame, without touching the store.
pub fn clean(mut frame: Frame) -> Result<Cleaned, IngestError> {
    let rows_read = frame.len();
    let synthesized_employee_id = cleaning::ensure_employee_id(&mut frame);
    if synthesized_employee_id {
        info!(rows = rows_read, "no EmployeeID column; assigned sequential ids");
    }

    let rows_dropped_missing_department = cleaning::drop_missing_department(&mut frame)?;
    info!(
        removed = rows_dropped_missing_department,
        remaining = frame.len(),
        "dropped rows with a missing Department"
    );

    let quarantined = cleaning::quarantine_invalid_rows(&mut frame);
    for row in &quarantined {
        warn!(
            line = row.line,
            column = %row.column,
            value = %row.value,
            reason = %row.reason,
            "row quarantined"
        );
    }

    let years_at_company_fill = cleaning::fill_years_at_company(&mut frame)?;
    if let Some(fill) = years_at_company_fill {
        info!(median = fill, "filled missing YearsAtCompany values");
    }

    let dropped_columns = cleaning::sanitize_columns(&mut frame)?;
    if !dropped_columns.is_empty() {
        warn!(columns = ?dropped_columns, "dropped columns with no usable name");
    }

    Ok(Cleaned {
        frame,
        rows_read,
        synthesized_employee_id,
        rows_dropped_missing_department,
        quarantined,
        years_at_company_fill,
        dropped_columns,
    })
}

/// Reads the configured CSV, cleans it and replaces the store's table.
pub async fn ingest(config: &IngestConfig, store: &Store) -> Result<IngestReport, IngestError> {
    let path = &config.csv_path;
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => IngestError::NotFound { path: path.clone() },
        _ => IngestError::Io {
            path: path.clone(),
            source,
        },
    })?;
    info!(path = %path.display(), "reading source CSV");

    let frame = Frame::from_reader(file)?;
    info!(rows = frame.len(), columns = frame.columns().len(), "parsed source CSV");

    let cleaned = clean(frame)?;
    load::write_table(store, &cleaned.frame).await?;

    let rows_written = load::count_rows(store).await?;
    let expected = cleaned.frame.len() as u64;
    if rows_written != expected as i64 {
        return Err(IngestError::CountMismatch {
            expected,
            found: rows_written,
        });
    }
    info!(
        table = store.settings().table_name(),
        rows = rows_written,
        "table replaced"
    );

    Ok(IngestReport {
        table: store.settings().table_name().to_string(),
        rows_read: cleaned.rows_read,
        synthesized_employee_id: cleaned.synthesized_employee_id,
        rows_dropped_missing_department: cleaned.rows_dropped_missing_department,
        rows_quarantined: cleaned.quarantined,
        years_at_company_fill: cleaned.years_at_company_fill,
        dropped_columns: cleaned.dropped_columns,
        columns: cleaned.frame.columns().to_vec(),
        rows_written,
    })
}
