//! Full-replace write of a cleaned frame.
//!
//! The new table is built under a staging name and swapped in inside one
//! transaction, so readers see either the previous table or the complete
//! new one.

use entity::columns;
use platform_db::{Store, quote_ident};
use sea_orm::{FromQueryResult, Statement, Value};

use crate::IngestError;
use crate::frame::Frame;

/// Stay under SQLite's historical bound-parameter limit.
const MAX_BOUND_PARAMS: usize = 999;

#[derive(Debug, FromQueryResult)]
struct RowCount {
    row_count: i64,
}

pub(crate) fn replace_table_statements(table: &str, frame: &Frame) -> Vec<Statement> {
    let target = quote_ident(table);
    let staging = quote_ident(&format!("{table}__staging"));
    let column_list = frame
        .columns()
        .iter()
        .map(|column| quote_ident(&column.name))
        .collect::<Vec<_>>()
        .join(", ");
    let column_defs = frame
        .columns()
        .iter()
        .map(|column| format!("{} {}", quote_ident(&column.name), column.kind.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut statements = vec![
        Store::statement(format!("DROP TABLE IF EXISTS {staging}"), vec![]),
        Store::statement(format!("CREATE TABLE {staging} ({column_defs})"), vec![]),
    ];

    let width = frame.columns().len().max(1);
    let rows_per_batch = (MAX_BOUND_PARAMS / width).max(1);
    let placeholders = format!("({})", vec!["?"; width].join(", "));
    for chunk in frame.rows().chunks(rows_per_batch) {
        let values_sql = vec![placeholders.as_str(); chunk.len()].join(", ");
        let params: Vec<Value> = chunk
            .iter()
            .flat_map(|row| row.cells.iter().map(|cell| cell.to_value()))
            .collect();
        statements.push(Store::statement(
            format!("INSERT INTO {staging} ({column_list}) VALUES {values_sql}"),
            params,
        ));
    }

    statements.push(Store::statement(
        format!("DROP TABLE IF EXISTS {target}"),
        vec![],
    ));
    statements.push(Store::statement(
        format!("ALTER TABLE {staging} RENAME TO {target}"),
        vec![],
    ));
    if frame.column_index(columns::EMPLOYEE_ID).is_some() {
        statements.push(Store::statement(
            format!(
                "CREATE UNIQUE INDEX {} ON {target} ({})",
                quote_ident(&format!("{table}_employee_id_key")),
                quote_ident(columns::EMPLOYEE_ID)
            ),
            vec![],
        ));
    }
    statements
}

pub(crate) async fn write_table(store: &Store, frame: &Frame) -> Result<(), IngestError> {
    let statements = replace_table_statements(store.settings().table_name(), frame);
    store.execute_batch(statements).await?;
    Ok(())
}

pub(crate) async fn count_rows(store: &Store) -> Result<i64, IngestError> {
    let sql = format!("SELECT COUNT(*) AS row_count FROM {}", store.table());
    let count = store
        .query_one::<RowCount>(&sql, vec![])
        .await?
        .map(|row| row.row_count)
        .unwrap_or_default();
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_are_batched_under_the_parameter_limit() {
        let mut csv = String::from("EmployeeID,Department\n");
        for id in 1..=1200 {
            csv.push_str(&format!("{id},Sales\n"));
        }
        let frame = Frame::from_reader(csv.as_bytes()).unwrap();
        let statements = replace_table_statements("employees", &frame);

        let inserts: Vec<&Statement> = statements
            .iter()
            .filter(|s| s.sql.starts_with("INSERT"))
            .collect();
        assert_eq!(inserts.len(), 3);
        for insert in &inserts {
            let bound = insert.values.as_ref().map(|v| v.0.len()).unwrap_or(0);
            assert!(bound <= MAX_BOUND_PARAMS);
        }

        assert!(statements[0].sql.contains("\"employees__staging\""));
        let last = statements.last().unwrap();
        assert!(last.sql.starts_with("CREATE UNIQUE INDEX"));
        assert!(last.sql.contains("(\"EmployeeID\")"));
    }
}
