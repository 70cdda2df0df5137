//! Canonical column names of the HR table.

pub const EMPLOYEE_ID: &str = "EmployeeID";
pub const DEPARTMENT: &str = "Department";
pub const JOB_ROLE: &str = "JobRole";
pub const PERFORMANCE_RATING: &str = "PerformanceRating";
pub const OVER_TIME: &str = "OverTime";
pub const MONTHLY_INCOME: &str = "MonthlyIncome";
pub const ATTRITION: &str = "Attrition";
pub const YEARS_AT_COMPANY: &str = "YearsAtCompany";

/// Columns selected for an [`EmployeeRecord`](crate::EmployeeRecord), in order.
pub const RECORD_COLUMNS: [&str; 7] = [
    EMPLOYEE_ID,
    DEPARTMENT,
    JOB_ROLE,
    PERFORMANCE_RATING,
    OVER_TIME,
    MONTHLY_INCOME,
    ATTRITION,
];
