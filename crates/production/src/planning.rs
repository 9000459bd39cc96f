//! Monthly production planning records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wagonops_core::{DomainError, DomainResult, EntryId, ProjectId};

/// One monthly production plan for a project.
///
/// Unique per (project, year, month); creating a second plan for the same
/// key is a conflict, not an upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPlan {
    pub id: EntryId,
    pub project_id: ProjectId,
    pub client_name: Option<String>,
    pub client_type: Option<String>,
    pub wagon_type: Option<String>,
    /// "YYYY-MM" as entered.
    pub month: String,
    pub month_num: u32,
    pub year: i32,
    pub monthly_target: i64,
    pub created_at: DateTime<Utc>,
}

impl MonthlyPlan {
    /// Parse a "YYYY-MM" month label into (year, month_num).
    pub fn parse_month(month: &str) -> DomainResult<(i32, u32)> {
        let invalid = || DomainError::validation(format!("month '{month}' is not YYYY-MM"));

        let (y, m) = month.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month_num: u32 = m.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month_num) {
            return Err(invalid());
        }
        Ok((year, month_num))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_label_parses_into_year_and_month() {
        assert_eq!(MonthlyPlan::parse_month("2025-09").unwrap(), (2025, 9));
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        assert!(MonthlyPlan::parse_month("2025-13").is_err());
        assert!(MonthlyPlan::parse_month("2025").is_err());
        assert!(MonthlyPlan::parse_month("sep-2025").is_err());
    }
}
