//! Cleaning passes applied between parsing and loading. They run in the
//! order [`crate::clean`] calls them; later passes rely on earlier ones.

use std::collections::HashMap;

use entity::{YesNo, columns};
use serde::Serialize;
use tracing::warn;

use crate::IngestError;
use crate::frame::{Cell, Column, ColumnKind, Frame};

/// A row excluded because a known column held a value of the wrong shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuarantinedRow {
    pub line: u64,
    pub column: String,
    pub value: String,
    pub reason: String,
}

enum Rule {
    Integer,
    Text,
    Flag,
}

static TYPED_COLUMNS: [(&str, Rule); 7] = [
    (columns::EMPLOYEE_ID, Rule::Integer),
    (columns::DEPARTMENT, Rule::Text),
    (columns::JOB_ROLE, Rule::Text),
    (columns::PERFORMANCE_RATING, Rule::Integer),
    (columns::OVER_TIME, Rule::Flag),
    (columns::MONTHLY_INCOME, Rule::Integer),
    (columns::ATTRITION, Rule::Flag),
];

/// Position of a known column, matched on the name it will have once
/// sanitised, so `Monthly Income` is typed as `MonthlyIncome`.
fn known_column(frame: &Frame, name: &str) -> Option<usize> {
    frame
        .columns()
        .iter()
        .position(|column| sanitize_name(&column.name) == name)
}

/// Adds `EmployeeID` = 1..=N as the first column unless the source has one.
/// Returns whether the column was synthesised.
pub(crate) fn ensure_employee_id(frame: &mut Frame) -> bool {
    if known_column(frame, columns::EMPLOYEE_ID).is_some() {
        return false;
    }
    let ids = (1..=frame.len() as i64).map(Cell::Integer).collect();
    frame.insert_column(
        0,
        Column {
            name: columns::EMPLOYEE_ID.to_string(),
            kind: ColumnKind::Integer,
        },
        ids,
    );
    true
}

/// Drops rows whose `Department` is missing and returns how many went.
pub(crate) fn drop_missing_department(frame: &mut Frame) -> Result<usize, IngestError> {
    let index = known_column(frame, columns::DEPARTMENT)
        .ok_or(IngestError::MissingColumn(columns::DEPARTMENT))?;
    let before = frame.rows.len();
    frame.rows.retain(|row| !row.cells[index].is_null());
    Ok(before - frame.rows.len())
}

/// Coerces the known columns to their fixed types and pulls out rows that
/// cannot be coerced. Nulls pass, except in `EmployeeID`.
pub(crate) fn quarantine_invalid_rows(frame: &mut Frame) -> Vec<QuarantinedRow> {
    let rules: Vec<(usize, &str, &Rule)> = TYPED_COLUMNS
        .iter()
        .filter_map(|(name, rule)| known_column(frame, name).map(|index| (index, *name, rule)))
        .collect();

    let mut quarantined = Vec::new();
    let source_columns = &frame.columns;
    frame.rows.retain_mut(|row| {
        for (index, name, rule) in &rules {
            let cell = &mut row.cells[*index];
            if let Err(reason) = coerce(cell, rule, *name == columns::EMPLOYEE_ID) {
                quarantined.push(QuarantinedRow {
                    line: row.line,
                    column: source_columns[*index].name.clone(),
                    value: cell.to_string(),
                    reason,
                });
                return false;
            }
        }
        true
    });

    for (index, _, rule) in rules {
        frame.columns[index].kind = match rule {
            Rule::Integer => ColumnKind::Integer,
            Rule::Text | Rule::Flag => ColumnKind::Text,
        };
    }
    quarantined
}

fn coerce(cell: &mut Cell, rule: &Rule, required: bool) -> Result<(), String> {
    if cell.is_null() {
        return if required {
            Err("value is missing".into())
        } else {
            Ok(())
        };
    }
    match rule {
        Rule::Integer => {
            let coerced = match cell {
                Cell::Integer(value) => Some(*value),
                Cell::Real(value) => integral(*value),
                Cell::Text(text) => text
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .or_else(|| text.trim().parse::<f64>().ok().and_then(integral)),
                Cell::Null => None,
            };
            let value = coerced.ok_or_else(|| "expected a whole number".to_string())?;
            *cell = Cell::Integer(value);
        }
        Rule::Text => {
            if !matches!(cell, Cell::Text(_)) {
                *cell = Cell::Text(cell.to_string());
            }
        }
        Rule::Flag => {
            let text = cell.to_string();
            if YesNo::parse(&text).is_none() {
                return Err("expected Yes or No".into());
            }
            *cell = Cell::Text(text);
        }
    }
    Ok(())
}

fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}

/// Fills missing `YearsAtCompany` values with the median of the present
/// ones. Returns the fill value when anything was filled.
pub(crate) fn fill_years_at_company(frame: &mut Frame) -> Result<Option<f64>, IngestError> {
    let Some(index) = known_column(frame, columns::YEARS_AT_COMPANY) else {
        return Ok(None);
    };
    if !frame.column_values(index).any(Cell::is_null) {
        return Ok(None);
    }

    let mut present = Vec::new();
    for cell in frame.column_values(index) {
        match cell {
            Cell::Null => {}
            Cell::Text(text) => {
                return Err(IngestError::NonNumericColumn {
                    column: frame.columns()[index].name.clone(),
                    value: text.clone(),
                });
            }
            numeric => present.extend(numeric.as_f64()),
        }
    }
    let Some(fill) = median(&mut present) else {
        warn!(
            column = columns::YEARS_AT_COMPANY,
            "every value is missing; nothing to compute a median from"
        );
        return Ok(None);
    };

    let column = &mut frame.columns[index];
    let fill_cell = match (column.kind, integral(fill)) {
        (ColumnKind::Integer, Some(whole)) => Cell::Integer(whole),
        _ => {
            column.kind = ColumnKind::Real;
            Cell::Real(fill)
        }
    };
    let promote = matches!(fill_cell, Cell::Real(_));
    for row in &mut frame.rows {
        let replacement = match &row.cells[index] {
            Cell::Null => Some(fill_cell.clone()),
            Cell::Integer(value) if promote => Some(Cell::Real(*value as f64)),
            _ => None,
        };
        if let Some(replacement) = replacement {
            row.cells[index] = replacement;
        }
    }
    Ok(Some(fill))
}

/// Median of the values; the mean of the middle pair for even counts.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Keeps only `[0-9a-zA-Z_]` from a column name.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Sanitises every column name and drops columns left with an empty name.
/// Two columns reducing to the same name fail the run. Returns the original
/// names of the dropped columns.
pub(crate) fn sanitize_columns(frame: &mut Frame) -> Result<Vec<String>, IngestError> {
    let mut seen: HashMap<String, String> = HashMap::new();
    for column in &frame.columns {
        let cleaned = sanitize_name(&column.name);
        if cleaned.is_empty() {
            continue;
        }
        if let Some(first) = seen.insert(cleaned.clone(), column.name.clone()) {
            return Err(IngestError::ColumnCollision {
                name: cleaned,
                first,
                second: column.name.clone(),
            });
        }
    }

    let mut dropped = Vec::new();
    let mut index = 0;
    while index < frame.columns.len() {
        let cleaned = sanitize_name(&frame.columns[index].name);
        if cleaned.is_empty() {
            dropped.push(frame.remove_column(index).name);
        } else {
            frame.columns[index].name = cleaned;
            index += 1;
        }
    }
    Ok(dropped)
}
