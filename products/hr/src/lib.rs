//! HR module: department filtering, KPI and chart aggregates, and the
//! "add employee" / "update income" write paths behind the dashboard.

pub mod analytics;
pub mod queries;

use entity::{EmployeeRecord, NewEmployee};
use platform_db::{DbError, Store};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::analytics::{
    CategoryCount, DepartmentFilter, Kpis, OvertimeAttrition, RatingCount,
};
use crate::queries::PerformanceAttrition;

/// Smallest monthly income the forms accept.
pub const MIN_MONTHLY_INCOME: i64 = 1000;
pub const PERFORMANCE_RATINGS: std::ops::RangeInclusive<i64> = 1..=4;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("{0}")]
    Validation(String),
    #[error("Employee ID {0} already exists")]
    DuplicateEmployee(i64),
    #[error("Employee ID {0} does not exist")]
    UnknownEmployee(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Outcome of a form submission, shown in place without ending the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn from_result(result: &Result<(), HrError>, success: impl Into<String>) -> Self {
        match result {
            Ok(()) => Notice::Success(success.into()),
            Err(HrError::Db(err)) => Notice::Error(format!("Database error: {err}")),
            Err(err) => Notice::Error(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Everything one dashboard render needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub filter: DepartmentFilter,
    pub departments: Vec<String>,
    pub kpis: Kpis,
    pub job_roles: Vec<CategoryCount>,
    pub performance_ratings: Vec<RatingCount>,
    pub attrition: Vec<CategoryCount>,
    pub attrition_by_overtime: Vec<OvertimeAttrition>,
    pub performance_vs_attrition: Vec<PerformanceAttrition>,
    pub employees: Vec<EmployeeRecord>,
}

/// Choices offered by the "add employee" form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormOptions {
    pub departments: Vec<String>,
    pub job_roles: Vec<String>,
    pub next_employee_id: i64,
}

#[derive(Clone, Debug)]
pub struct HrModule {
    store: Store,
}

impl HrModule {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Fetches the whole table. O(rows) per call, one call per interaction.
    pub async fn snapshot(&self) -> Result<Vec<EmployeeRecord>, HrError> {
        Ok(queries::fetch_snapshot(&self.store).await?)
    }

    /// Sidebar choices: "All" followed by the distinct departments in name order.
    pub async fn departments(&self) -> Result<Vec<String>, HrError> {
        let snapshot = self.snapshot().await?;
        let mut options = vec![DepartmentFilter::ALL_LABEL.to_string()];
        options.extend(analytics::departments(&snapshot));
        Ok(options)
    }

    pub async fn view(&self, filter: DepartmentFilter) -> Result<DashboardView, HrError> {
        let snapshot = self.snapshot().await?;
        let departments = analytics::departments(&snapshot);
        let employees = analytics::filter_by_department(snapshot, &filter);
        let performance_vs_attrition =
            queries::performance_vs_attrition(&self.store, &filter).await?;
        info!(
            department = filter.label(),
            rows = employees.len(),
            "dashboard view computed"
        );
        Ok(DashboardView {
            kpis: analytics::kpis(&employees),
            job_roles: analytics::job_role_distribution(&employees),
            performance_ratings: analytics::performance_rating_distribution(&employees),
            attrition: analytics::attrition_breakdown(&employees),
            attrition_by_overtime: analytics::attrition_rate_by_overtime(&employees),
            performance_vs_attrition,
            departments,
            filter,
            employees,
        })
    }

    pub async fn form_options(&self) -> Result<FormOptions, HrError> {
        let snapshot = self.snapshot().await?;
        let next_employee_id = analytics::next_employee_id(&snapshot).ok_or_else(|| {
            HrError::Validation("No Employee ID is left above the current maximum".into())
        })?;
        Ok(FormOptions {
            departments: analytics::departments(&snapshot),
            job_roles: analytics::job_roles(&snapshot),
            next_employee_id,
        })
    }

    /// Inserts a new hire whose id is above every existing one. Reusing a
    /// taken id reports the duplicate; a free id at or below the maximum is
    /// a validation error.
    pub async fn add_employee(&self, employee: &NewEmployee) -> Result<(), HrError> {
        validate_new_employee(employee)?;
        if let Some(max) = queries::max_employee_id(&self.store).await? {
            if employee.employee_id <= max {
                if queries::employee_exists(&self.store, employee.employee_id).await? {
                    return Err(HrError::DuplicateEmployee(employee.employee_id));
                }
                return Err(HrError::Validation(format!(
                    "Employee ID must be greater than the current maximum ({max})"
                )));
            }
        }
        match queries::insert_employee(&self.store, employee).await {
            Ok(()) => {
                info!(employee_id = employee.employee_id, "employee added");
                Ok(())
            }
            Err(DbError::DuplicateKey(_)) => Err(HrError::DuplicateEmployee(employee.employee_id)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update_income(&self, employee_id: i64, monthly_income: i64) -> Result<(), HrError> {
        validate_income(monthly_income)?;
        if !queries::employee_exists(&self.store, employee_id).await? {
            return Err(HrError::UnknownEmployee(employee_id));
        }
        queries::update_monthly_income(&self.store, employee_id, monthly_income).await?;
        info!(employee_id, monthly_income, "monthly income updated");
        Ok(())
    }
}

pub fn validate_new_employee(employee: &NewEmployee) -> Result<(), HrError> {
    if employee.employee_id < 1 {
        return Err(HrError::Validation("Employee ID must be positive".into()));
    }
    if employee.employee_id == i64::MAX {
        return Err(HrError::Validation(format!(
            "Employee ID must be below {}",
            i64::MAX
        )));
    }
    if employee.department.trim().is_empty() {
        return Err(HrError::Validation("Department is required".into()));
    }
    if employee.job_role.trim().is_empty() {
        return Err(HrError::Validation("Job role is required".into()));
    }
    if !PERFORMANCE_RATINGS.contains(&employee.performance_rating) {
        return Err(HrError::Validation(format!(
            "Performance rating must be between {} and {}",
            PERFORMANCE_RATINGS.start(),
            PERFORMANCE_RATINGS.end()
        )));
    }
    validate_income(employee.monthly_income)
}

pub fn validate_income(monthly_income: i64) -> Result<(), HrError> {
    if monthly_income < MIN_MONTHLY_INCOME {
        return Err(HrError::Validation(format!(
            "Monthly income must be at least {MIN_MONTHLY_INCOME}"
        )));
    }
    Ok(())
}
