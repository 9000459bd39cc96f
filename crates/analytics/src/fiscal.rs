//! Fiscal year labels and month sequences.

use serde::{Deserialize, Serialize};

use wagonops_core::{DomainError, DomainResult};

const MONTH_ABBREVS: [&str; 12] = [
    "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec", "Jan", "Feb", "Mar",
];

/// A fiscal year, labelled "YYYY-YY" (April through March), e.g. "2025-26".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    pub fn from_start_year(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Parse a "YYYY-YY" label. The second part must be the two-digit year
    /// following the first ("2025-26", not "2025-27").
    pub fn parse(label: &str) -> DomainResult<Self> {
        let invalid = || DomainError::validation(format!("fiscal year '{label}' is not YYYY-YY"));

        let (start, end) = label.trim().split_once('-').ok_or_else(invalid)?;
        if start.len() != 4 || end.len() != 2 {
            return Err(invalid());
        }
        let start_year: i32 = start.parse().map_err(|_| invalid())?;
        let end_two: i32 = end.parse().map_err(|_| invalid())?;
        if (start_year + 1).rem_euclid(100) != end_two {
            return Err(invalid());
        }
        Ok(Self { start_year })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn label(&self) -> String {
        format!(
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }

    /// The previous fiscal year (default comparison year).
    pub fn prev(&self) -> Self {
        Self {
            start_year: self.start_year - 1,
        }
    }

    /// The twelve canonical month labels for this fiscal year, Apr'YY
    /// through Mar'YY+1.
    pub fn month_labels(&self) -> Vec<String> {
        MONTH_ABBREVS
            .iter()
            .enumerate()
            .map(|(i, abbrev)| {
                let year = if i < 9 { self.start_year } else { self.start_year + 1 };
                format!("{}'{:02}", abbrev, year.rem_euclid(100))
            })
            .collect()
    }
}

impl core::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.label())
    }
}

impl TryFrom<String> for FiscalYear {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FiscalYear> for String {
    fn from(value: FiscalYear) -> Self {
        value.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_round_trips_labels() {
        let fy = FiscalYear::parse("2025-26").unwrap();
        assert_eq!(fy.start_year(), 2025);
        assert_eq!(fy.label(), "2025-26");
        assert_eq!(fy.prev().label(), "2024-25");
    }

    #[test]
    fn century_boundary_labels() {
        assert_eq!(FiscalYear::parse("2099-00").unwrap().label(), "2099-00");
    }

    #[test]
    fn malformed_labels_are_rejected() {
        assert!(FiscalYear::parse("2025").is_err());
        assert!(FiscalYear::parse("2025-27").is_err());
        assert!(FiscalYear::parse("25-26").is_err());
    }

    #[test]
    fn month_labels_span_april_to_march() {
        let labels = FiscalYear::parse("2025-26").unwrap().month_labels();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels[0], "Apr'25");
        assert_eq!(labels[8], "Dec'25");
        assert_eq!(labels[9], "Jan'26");
        assert_eq!(labels[11], "Mar'26");
    }
}
