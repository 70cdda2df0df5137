use std::path::{Path, PathBuf};

use ingest::{IngestConfig, IngestError, IngestErrorKind, ingest};
use platform_db::{DatabaseSettings, Store};
use sea_orm::FromQueryResult;
use uuid::Uuid;

#[derive(Debug, PartialEq, FromQueryResult)]
struct EmployeeRow {
    employee_id: i64,
    department: String,
    monthly_income: i64,
    years_at_company: Option<i64>,
}

#[derive(Debug, PartialEq, FromQueryResult)]
struct FlagAndIncome {
    over_time: String,
    monthly_income: i64,
}

#[derive(Debug, FromQueryResult)]
struct ColumnName {
    name: String,
}

struct Workspace {
    dir: PathBuf,
    store: Store,
}

impl Workspace {
    fn new() -> Self {
        let dir = std::env::temp_dir()
            .join("ingest-tests")
            .join(Uuid::new_v4().simple().to_string());
        std::fs::create_dir_all(&dir).unwrap();
        let settings = DatabaseSettings::new(dir.join("hr.db"), "employees").unwrap();
        Self {
            dir,
            store: Store::new(settings),
        }
    }

    fn csv(&self, name: &str, contents: &str) -> IngestConfig {
        let path = self.dir.join(name);
        std::fs::write(&path, contents).unwrap();
        IngestConfig::new(path)
    }

    async fn employees(&self) -> Vec<EmployeeRow> {
        self.store
            .query(
                "SELECT EmployeeID AS employee_id, Department AS department, \
                 MonthlyIncome AS monthly_income, YearsAtCompany AS years_at_company \
                 FROM employees ORDER BY EmployeeID",
                vec![],
            )
            .await
            .unwrap()
    }

    async fn column_names(&self) -> Vec<String> {
        self.store
            .query::<ColumnName>("SELECT name FROM pragma_table_info('employees')", vec![])
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

const MESSY: &str = "Department,MonthlyIncome,YearsAtCompany\n\
                     ,5000,2\n\
                     Sales,3000,\n\
                     Sales,4000,5\n";

#[tokio::test]
async fn ids_are_assigned_before_missing_departments_are_dropped() {
    let ws = Workspace::new();
    let config = ws.csv("messy.csv", MESSY);

    let report = ingest(&config, &ws.store).await.unwrap();
    assert_eq!(report.rows_read, 3);
    assert!(report.synthesized_employee_id);
    assert_eq!(report.rows_dropped_missing_department, 1);
    assert_eq!(report.years_at_company_fill, Some(5.0));
    assert_eq!(report.rows_written, 2);

    assert_eq!(
        ws.employees().await,
        vec![
            EmployeeRow {
                employee_id: 2,
                department: "Sales".into(),
                monthly_income: 3000,
                years_at_company: Some(5),
            },
            EmployeeRow {
                employee_id: 3,
                department: "Sales".into(),
                monthly_income: 4000,
                years_at_company: Some(5),
            },
        ]
    );
    assert_eq!(
        ws.column_names().await,
        vec!["EmployeeID", "Department", "MonthlyIncome", "YearsAtCompany"]
    );
}

#[tokio::test]
async fn written_column_names_are_sanitised() {
    let ws = Workspace::new();
    let config = ws.csv(
        "headers.csv",
        "Department,Monthly Income ($),Years-At-Company,#\nR&D,4200,3,x\n",
    );
    let report = ingest(&config, &ws.store).await.unwrap();
    assert_eq!(report.dropped_columns, vec!["#".to_string()]);

    let names = ws.column_names().await;
    assert_eq!(
        names,
        vec!["EmployeeID", "Department", "MonthlyIncome", "YearsAtCompany"]
    );
    for name in names {
        assert!(!name.is_empty());
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }
}

#[tokio::test]
async fn missing_source_is_not_found_and_writes_nothing() {
    let ws = Workspace::new();
    let config = IngestConfig::new(ws.dir.join("absent.csv"));

    let err = ingest(&config, &ws.store).await.unwrap_err();
    assert_eq!(err.kind(), IngestErrorKind::NotFound);
    assert_eq!(err.kind().exit_code(), 2);
    assert!(!Path::new(ws.store.settings().database_path()).exists());
}

#[tokio::test]
async fn reruns_fully_replace_the_table() {
    let ws = Workspace::new();
    ingest(&ws.csv("first.csv", MESSY), &ws.store).await.unwrap();

    let second = ws.csv(
        "second.csv",
        "EmployeeID,Department,MonthlyIncome,YearsAtCompany\n40,HR,2500,1\n",
    );
    let report = ingest(&second, &ws.store).await.unwrap();
    assert!(!report.synthesized_employee_id);
    assert_eq!(report.rows_written, 1);
    assert_eq!(
        ws.employees().await,
        vec![EmployeeRow {
            employee_id: 40,
            department: "HR".into(),
            monthly_income: 2500,
            years_at_company: Some(1),
        }]
    );

    ingest(&second, &ws.store).await.unwrap();
    assert_eq!(ws.employees().await.len(), 1);
}

#[tokio::test]
async fn failed_runs_leave_the_previous_table_untouched() {
    let ws = Workspace::new();
    ingest(&ws.csv("good.csv", MESSY), &ws.store).await.unwrap();

    let duplicates = ws.csv(
        "dupes.csv",
        "EmployeeID,Department,MonthlyIncome\n7,Sales,3000\n7,HR,3100\n",
    );
    let err = ingest(&duplicates, &ws.store).await.unwrap_err();
    assert!(matches!(err, IngestError::DuplicateEmployeeId(_)), "{err}");
    assert_eq!(err.kind(), IngestErrorKind::Ingestion);

    let collision = ws.csv(
        "collision.csv",
        "Department,Job Role,JobRole\nSales,A,B\n",
    );
    let err = ingest(&collision, &ws.store).await.unwrap_err();
    assert!(matches!(err, IngestError::ColumnCollision { .. }), "{err}");

    let ids: Vec<i64> = ws.employees().await.iter().map(|e| e.employee_id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn missing_department_column_fails_the_run() {
    let ws = Workspace::new();
    let config = ws.csv("nodept.csv", "Age,MonthlyIncome\n30,4000\n");
    let err = ingest(&config, &ws.store).await.unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn("Department")));
}

#[tokio::test]
async fn unsanitised_known_headers_are_typed_before_load() {
    let ws = Workspace::new();
    let config = ws.csv(
        "spaced.csv",
        "Department,Over Time,Monthly Income\n\
         Sales,Maybe,3000\n\
         Sales,Yes,lots\n\
         HR,No,4000\n",
    );
    let report = ingest(&config, &ws.store).await.unwrap();
    let quarantined: Vec<(u64, &str)> = report
        .rows_quarantined
        .iter()
        .map(|q| (q.line, q.column.as_str()))
        .collect();
    assert_eq!(quarantined, vec![(2, "Over Time"), (3, "Monthly Income")]);
    assert_eq!(report.rows_written, 1);

    let rows: Vec<FlagAndIncome> = ws
        .store
        .query(
            "SELECT OverTime AS over_time, MonthlyIncome AS monthly_income FROM employees",
            vec![],
        )
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![FlagAndIncome {
            over_time: "No".into(),
            monthly_income: 4000,
        }]
    );
}

#[tokio::test]
async fn complete_text_years_column_is_loaded_as_is() {
    let ws = Workspace::new();
    let config = ws.csv(
        "years.csv",
        "Department,MonthlyIncome,YearsAtCompany\nSales,3000,five\nSales,4000,5\n",
    );
    let report = ingest(&config, &ws.store).await.unwrap();
    assert_eq!(report.years_at_company_fill, None);
    assert_eq!(report.rows_written, 2);
}
