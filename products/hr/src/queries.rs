//! Statements the dashboard issues against the store. Values are always
//! bound; only the validated table name and fixed column names are spliced
//! into SQL text.

use entity::{EmployeeRecord, NewEmployee, YesNo, columns};
use platform_db::{DbResult, Store, quote_ident};
use sea_orm::{DbErr, FromQueryResult, QueryResult, Value};
use serde::Serialize;

use crate::analytics::DepartmentFilter;

/// One cell of the performance-rating by attrition cross tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PerformanceAttrition {
    pub performance_rating: i64,
    pub attrition: Option<YesNo>,
    pub count: i64,
}

impl FromQueryResult for PerformanceAttrition {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        let attrition = res.try_get::<Option<String>>(pre, "attrition")?;
        Ok(Self {
            performance_rating: res.try_get(pre, "performance_rating")?,
            attrition: YesNo::from_column(attrition, columns::ATTRITION)?,
            count: res.try_get(pre, "count")?,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct EmployeeId {
    employee_id: i64,
}

#[derive(Debug, FromQueryResult)]
struct MaxEmployeeId {
    max_id: Option<i64>,
}

fn col(name: &str) -> String {
    quote_ident(name)
}

/// Loads every employee. Cost grows with the table; the dashboard calls
/// this once per interaction.
pub async fn fetch_snapshot(store: &Store) -> DbResult<Vec<EmployeeRecord>> {
    let select_list = columns::RECORD_COLUMNS
        .iter()
        .map(|name| col(name))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {select_list} FROM {} ORDER BY {}",
        store.table(),
        col(columns::EMPLOYEE_ID)
    );
    store.query(&sql, vec![]).await
}

/// Counts per (rating, attrition) pair, filtered in the store. Rows without
/// a rating are left out.
pub async fn performance_vs_attrition(
    store: &Store,
    filter: &DepartmentFilter,
) -> DbResult<Vec<PerformanceAttrition>> {
    let rating = col(columns::PERFORMANCE_RATING);
    let attrition = col(columns::ATTRITION);
    let sql = format!(
        "WITH filtered AS ( \
             SELECT {rating}, {attrition} FROM {table} \
             WHERE ? IS NULL OR {department} = ? \
         ) \
         SELECT {rating} AS performance_rating, {attrition} AS attrition, COUNT(*) AS count \
         FROM filtered \
         WHERE {rating} IS NOT NULL \
         GROUP BY {rating}, {attrition} \
         ORDER BY {rating}, {attrition}",
        table = store.table(),
        department = col(columns::DEPARTMENT),
    );
    let department = filter.department().map(str::to_string);
    store
        .query(&sql, vec![department.clone().into(), department.into()])
        .await
}

pub async fn employee_exists(store: &Store, employee_id: i64) -> DbResult<bool> {
    let sql = format!(
        "SELECT {id} AS employee_id FROM {table} WHERE {id} = ? LIMIT 1",
        id = col(columns::EMPLOYEE_ID),
        table = store.table(),
    );
    let found = store
        .query_one::<EmployeeId>(&sql, vec![employee_id.into()])
        .await?;
    Ok(found.is_some_and(|row| row.employee_id == employee_id))
}

/// Highest `EmployeeID` in the table; `None` when it is empty.
pub async fn max_employee_id(store: &Store) -> DbResult<Option<i64>> {
    let sql = format!(
        "SELECT MAX({}) AS max_id FROM {}",
        col(columns::EMPLOYEE_ID),
        store.table()
    );
    let row = store.query_one::<MaxEmployeeId>(&sql, vec![]).await?;
    Ok(row.and_then(|row| row.max_id))
}

/// Appends a new hire. New rows always start with `Attrition = No`.
pub async fn insert_employee(store: &Store, employee: &NewEmployee) -> DbResult<()> {
    let column_list = [
        columns::EMPLOYEE_ID,
        columns::DEPARTMENT,
        columns::JOB_ROLE,
        columns::PERFORMANCE_RATING,
        columns::OVER_TIME,
        columns::MONTHLY_INCOME,
        columns::ATTRITION,
    ]
    .iter()
    .map(|name| col(name))
    .collect::<Vec<_>>()
    .join(", ");
    let sql = format!(
        "INSERT INTO {} ({column_list}) VALUES (?, ?, ?, ?, ?, ?, ?)",
        store.table()
    );
    let params: Vec<Value> = vec![
        employee.employee_id.into(),
        employee.department.clone().into(),
        employee.job_role.clone().into(),
        employee.performance_rating.into(),
        employee.over_time.as_str().into(),
        employee.monthly_income.into(),
        YesNo::No.as_str().into(),
    ];
    store.execute(&sql, params).await
}

pub async fn update_monthly_income(
    store: &Store,
    employee_id: i64,
    monthly_income: i64,
) -> DbResult<()> {
    let sql = format!(
        "UPDATE {} SET {} = ? WHERE {} = ?",
        store.table(),
        col(columns::MONTHLY_INCOME),
        col(columns::EMPLOYEE_ID)
    );
    store
        .execute(&sql, vec![monthly_income.into(), employee_id.into()])
        .await
}
