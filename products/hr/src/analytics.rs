//! Pure aggregations over a loaded snapshot. Every function accepts an empty
//! slice and returns zero counts and zero rates for it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use entity::{EmployeeRecord, YesNo};
use serde::{Deserialize, Serialize};

/// The sidebar department selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepartmentFilter {
    #[default]
    All,
    Department(String),
}

impl DepartmentFilter {
    pub const ALL_LABEL: &'static str = "All";

    pub fn parse(selection: &str) -> Self {
        if selection == Self::ALL_LABEL {
            DepartmentFilter::All
        } else {
            DepartmentFilter::Department(selection.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DepartmentFilter::All => Self::ALL_LABEL,
            DepartmentFilter::Department(name) => name.as_str(),
        }
    }

    pub fn matches(&self, department: &str) -> bool {
        match self {
            DepartmentFilter::All => true,
            DepartmentFilter::Department(name) => name == department,
        }
    }

    /// `None` disables the department predicate in store-side queries.
    pub fn department(&self) -> Option<&str> {
        match self {
            DepartmentFilter::All => None,
            DepartmentFilter::Department(name) => Some(name.as_str()),
        }
    }
}

/// Keeps the rows of the selected department. `All` hands the snapshot back as is.
pub fn filter_by_department(
    records: Vec<EmployeeRecord>,
    filter: &DepartmentFilter,
) -> Vec<EmployeeRecord> {
    match filter {
        DepartmentFilter::All => records,
        DepartmentFilter::Department(_) => records
            .into_iter()
            .filter(|record| filter.matches(&record.department))
            .collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Kpis {
    pub headcount: usize,
    /// Mean over rows with a recorded income, truncated toward zero.
    pub average_monthly_income: i64,
    /// Percentage of rows with `Attrition = Yes`.
    pub attrition_rate: f64,
}

pub fn kpis(records: &[EmployeeRecord]) -> Kpis {
    let incomes: Vec<i64> = records.iter().filter_map(|r| r.monthly_income).collect();
    let average_monthly_income = if incomes.is_empty() {
        0
    } else {
        (incomes.iter().map(|&v| v as f64).sum::<f64>() / incomes.len() as f64) as i64
    };
    let leavers = records
        .iter()
        .filter(|r| r.attrition.is_some_and(YesNo::is_yes))
        .count();
    Kpis {
        headcount: records.len(),
        average_monthly_income,
        attrition_rate: percentage(leavers, records.len()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RatingCount {
    pub rating: i64,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OvertimeAttrition {
    pub over_time: YesNo,
    pub headcount: usize,
    pub attrition_rate: f64,
}

/// Rows per job role, most common first.
pub fn job_role_distribution(records: &[EmployeeRecord]) -> Vec<CategoryCount> {
    value_counts(records.iter().filter_map(|r| r.job_role.clone()))
}

/// Rows per performance rating, in rating order.
pub fn performance_rating_distribution(records: &[EmployeeRecord]) -> Vec<RatingCount> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for rating in records.iter().filter_map(|r| r.performance_rating) {
        *counts.entry(rating).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(rating, count)| RatingCount { rating, count })
        .collect()
}

/// Rows per attrition flag, most common first.
pub fn attrition_breakdown(records: &[EmployeeRecord]) -> Vec<CategoryCount> {
    value_counts(
        records
            .iter()
            .filter_map(|r| r.attrition.map(|flag| flag.as_str().to_string())),
    )
}

/// Share of leavers within each overtime group. A group with no leavers
/// reports 0 rather than being left out.
pub fn attrition_rate_by_overtime(records: &[EmployeeRecord]) -> Vec<OvertimeAttrition> {
    let mut groups: BTreeMap<&'static str, (YesNo, usize, usize, usize)> = BTreeMap::new();
    for record in records {
        let Some(over_time) = record.over_time else {
            continue;
        };
        let entry = groups
            .entry(over_time.as_str())
            .or_insert((over_time, 0, 0, 0));
        entry.1 += 1;
        if let Some(attrition) = record.attrition {
            entry.2 += 1;
            if attrition.is_yes() {
                entry.3 += 1;
            }
        }
    }
    groups
        .into_values()
        .map(|(over_time, headcount, flagged, leavers)| OvertimeAttrition {
            over_time,
            headcount,
            attrition_rate: percentage(leavers, flagged),
        })
        .collect()
}

/// Distinct departments in name order.
pub fn departments(records: &[EmployeeRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.department.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct job roles in name order.
pub fn job_roles(records: &[EmployeeRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.job_role.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The id offered by default on the "add employee" form. `None` once the
/// highest id is `i64::MAX` and no larger one exists.
pub fn next_employee_id(records: &[EmployeeRecord]) -> Option<i64> {
    match records.iter().map(|r| r.employee_id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn value_counts(values: impl Iterator<Item = String>) -> Vec<CategoryCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount { label, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranked
}
