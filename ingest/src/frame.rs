//! In-memory row set parsed from a CSV export, with one inferred type per column.

use std::fmt;
use std::io::Read;

use sea_orm::Value;
use serde::Serialize;

/// Tokens read as missing values, matching what spreadsheet and pandas
/// exports commonly emit.
const NULL_TOKENS: [&str; 19] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(value) => Some(*value as f64),
            Cell::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            Cell::Null => Value::from(None::<String>),
            Cell::Integer(value) => Value::from(*value),
            Cell::Real(value) => Value::from(*value),
            Cell::Text(value) => Value::from(value.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(value) => write!(f, "{value}"),
            Cell::Real(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text => "TEXT",
        }
    }

    fn convert(self, raw: &str) -> Option<Cell> {
        match self {
            ColumnKind::Integer => raw.parse::<i64>().ok().map(Cell::Integer),
            ColumnKind::Real => raw.parse::<f64>().ok().map(Cell::Real),
            ColumnKind::Text => Some(Cell::Text(raw.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// One data row. `line` is the 1-based line of the record in the source file.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub line: u64,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<Row>,
}

impl Frame {
    /// Parses a headed CSV document. Every record must have as many fields
    /// as the header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut raw_rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let fields: Vec<Option<String>> = record
                .iter()
                .map(|field| (!NULL_TOKENS.contains(&field)).then(|| field.to_string()))
                .collect();
            raw_rows.push((line, fields));
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let values = raw_rows
                    .iter()
                    .filter_map(|(_, fields)| fields[index].as_deref());
                Column {
                    name,
                    kind: infer_kind(values),
                }
            })
            .collect();

        let rows = raw_rows
            .into_iter()
            .map(|(line, fields)| Row {
                line,
                cells: fields
                    .into_iter()
                    .zip(&columns)
                    .map(|(field, column)| match field {
                        None => Cell::Null,
                        Some(raw) => column
                            .kind
                            .convert(&raw)
                            .unwrap_or(Cell::Text(raw)),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Values of one column in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row.cells[index])
    }

    pub(crate) fn insert_column(&mut self, index: usize, column: Column, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.insert(index, column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.cells.insert(index, value);
        }
    }

    pub(crate) fn remove_column(&mut self, index: usize) -> Column {
        for row in &mut self.rows {
            row.cells.remove(index);
        }
        self.columns.remove(index)
    }
}

/// Narrowest kind that every non-null value parses as.
fn infer_kind<'a>(values: impl Iterator<Item = &'a str> + Clone) -> ColumnKind {
    let mut any = values.clone().peekable();
    if any.peek().is_none() {
        return ColumnKind::Text;
    }
    if values.clone().all(|v| v.parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if values.clone().all(|v| v.parse::<f64>().is_ok()) {
        ColumnKind::Real
    } else {
        ColumnKind::Text
    }
}
