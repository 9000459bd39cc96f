use serde::{Deserialize, Serialize};

use wagonops_core::{DomainError, DomainResult};

/// Sales channel classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// State rail.
    IR,
    /// Private operators.
    Pvt,
}

impl Segment {
    pub const ALL: [Segment; 2] = [Segment::IR, Segment::Pvt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::IR => "IR",
            Segment::Pvt => "Pvt",
        }
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw.trim() {
            "IR" => Ok(Segment::IR),
            "Pvt" => Ok(Segment::Pvt),
            other => Err(DomainError::validation(format!(
                "segment must be IR or Pvt, got '{other}'"
            ))),
        }
    }
}

impl core::fmt::Display for Segment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planned quantity for one (fy, month, segment). Upserted, last write
/// wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRow {
    pub fy: String,
    /// Month label as entered, e.g. "Apr'25". May carry a stale year suffix;
    /// the merge matches on the three-letter abbreviation only.
    pub month: String,
    pub segment: Segment,
    pub plan: i64,
}

/// An achieved quantity for one (fy, month, segment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRow {
    pub fy: String,
    pub month: String,
    pub segment: Segment,
    pub achieved: i64,
}
