//! Plain-text rendering of a dashboard view for the terminal.

use std::fmt::{self, Write};

use entity::EmployeeRecord;
use products_hr::DashboardView;

const BAR_WIDTH: usize = 30;

/// Text layout of a [`DashboardView`]: KPIs, the charts as bar lists and
/// the employee table.
pub struct Dashboard<'a>(pub &'a DashboardView);

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(out, "HR Attrition Dashboard ({})", view.filter.label())?;
        writeln!(out)?;
        writeln!(out, "  Total Employees       {}", view.kpis.headcount)?;
        writeln!(
            out,
            "  Avg. Monthly Income   ${}",
            thousands(view.kpis.average_monthly_income)
        )?;
        writeln!(out, "  Attrition Rate        {:.2}%", view.kpis.attrition_rate)?;

        section(out, "Job Role Distribution")?;
        let max = view.job_roles.iter().map(|c| c.count).max().unwrap_or(0);
        for entry in &view.job_roles {
            bar_line(out, &entry.label, entry.count, max)?;
        }

        section(out, "Performance Rating Distribution")?;
        let max = view.performance_ratings.iter().map(|c| c.count).max().unwrap_or(0);
        for entry in &view.performance_ratings {
            bar_line(out, &entry.rating.to_string(), entry.count, max)?;
        }

        section(out, "Attrition Breakdown")?;
        for entry in &view.attrition {
            writeln!(out, "  {:<28} {:>6}", entry.label, entry.count)?;
        }

        section(out, "Attrition Rate by Overtime")?;
        for group in &view.attrition_by_overtime {
            writeln!(
                out,
                "  {:<28} {:>6.2}%  ({} employees)",
                group.over_time, group.attrition_rate, group.headcount
            )?;
        }

        section(out, "Performance Rating vs Attrition")?;
        for cell in &view.performance_vs_attrition {
            let attrition = cell.attrition.map_or("-", |a| a.as_str());
            writeln!(
                out,
                "  rating {:<3} attrition {:<4} {:>6}",
                cell.performance_rating, attrition, cell.count
            )?;
        }

        section(out, "Employee Data")?;
        writeln!(
            out,
            "  {:>6}  {:<24} {:<26} {:>6} {:>8} {:>8} {:>9}",
            "ID", "Department", "JobRole", "Rating", "OverTime", "Income", "Attrition"
        )?;
        for record in &view.employees {
            employee_line(out, record)?;
        }
        Ok(())
    }
}

pub fn departments(options: &[String]) -> String {
    options.join("\n")
}

fn section(out: &mut impl Write, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")
}

fn bar_line(out: &mut impl Write, label: &str, count: usize, max: usize) -> fmt::Result {
    let width = if max == 0 { 0 } else { count * BAR_WIDTH / max };
    writeln!(out, "  {label:<28} {count:>6} {}", "#".repeat(width))
}

fn employee_line(out: &mut impl Write, record: &EmployeeRecord) -> fmt::Result {
    writeln!(
        out,
        "  {:>6}  {:<24} {:<26} {:>6} {:>8} {:>8} {:>9}",
        record.employee_id,
        record.department,
        record.job_role.as_deref().unwrap_or(""),
        optional(record.performance_rating),
        record.over_time.map_or("", |v| v.as_str()),
        optional(record.monthly_income),
        record.attrition.map_or("", |v| v.as_str()),
    )
}

fn optional(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `6503` -> `6,503`.
fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
