use std::fmt;

use sea_orm::{DbErr, FromQueryResult, QueryResult};
use serde::{Deserialize, Serialize};

use crate::columns;

/// The `Yes`/`No` flags stored in `OverTime` and `Attrition`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Yes" => Some(YesNo::Yes),
            "No" => Some(YesNo::No),
            _ => None,
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, YesNo::Yes)
    }

    /// Decodes a nullable flag column, rejecting anything but `Yes`/`No`.
    pub fn from_column(raw: Option<String>, column: &str) -> Result<Option<Self>, DbErr> {
        match raw {
            None => Ok(None),
            Some(text) => Self::parse(&text)
                .map(Some)
                .ok_or_else(|| DbErr::Type(format!("{column}: expected Yes or No, got {text:?}"))),
        }
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One employee row as the dashboard sees it.
///
/// `Department` is guaranteed non-null by ingestion; the remaining columns
/// tolerate nulls carried over from the source export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: i64,
    pub department: String,
    pub job_role: Option<String>,
    pub performance_rating: Option<i64>,
    pub over_time: Option<YesNo>,
    pub monthly_income: Option<i64>,
    pub attrition: Option<YesNo>,
}

impl FromQueryResult for EmployeeRecord {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        let over_time = res.try_get::<Option<String>>(pre, columns::OVER_TIME)?;
        let attrition = res.try_get::<Option<String>>(pre, columns::ATTRITION)?;
        Ok(Self {
            employee_id: res.try_get(pre, columns::EMPLOYEE_ID)?,
            department: res.try_get(pre, columns::DEPARTMENT)?,
            job_role: res.try_get(pre, columns::JOB_ROLE)?,
            performance_rating: res.try_get(pre, columns::PERFORMANCE_RATING)?,
            over_time: YesNo::from_column(over_time, columns::OVER_TIME)?,
            monthly_income: res.try_get(pre, columns::MONTHLY_INCOME)?,
            attrition: YesNo::from_column(attrition, columns::ATTRITION)?,
        })
    }
}

/// Payload of the "add employee" form. New hires always start with
/// `Attrition = "No"`, so the flag is not part of the input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub employee_id: i64,
    pub department: String,
    pub job_role: String,
    pub performance_rating: i64,
    pub over_time: YesNo,
    pub monthly_income: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_parsing_is_exact() {
        assert_eq!(YesNo::parse("Yes"), Some(YesNo::Yes));
        assert_eq!(YesNo::parse("No"), Some(YesNo::No));
        assert_eq!(YesNo::parse("yes"), None);
        assert_eq!(YesNo::parse(""), None);
    }

    #[test]
    fn unexpected_flag_value_is_a_type_error() {
        let err = YesNo::from_column(Some("Maybe".into()), columns::ATTRITION).unwrap_err();
        assert!(matches!(err, DbErr::Type(msg) if msg.contains("Attrition")));
        assert_eq!(YesNo::from_column(None, columns::ATTRITION).unwrap(), None);
    }
}
