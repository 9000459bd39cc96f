//! Daily sale/delivery records.
//!
//! These are the "Daily Update" rows: one per day a project sold/delivered
//! wagons. Pullouts write one automatically so the sales view reflects
//! dispatches without manual entry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use wagonops_core::{EntryId, ProjectId};

/// How a daily update came to exist.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateSource {
    /// Entered by hand through the daily-updates endpoint.
    Manual,
    /// Written as a side effect of a pullout event.
    Pullout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUpdate {
    pub id: EntryId,
    pub project_id: ProjectId,
    pub date: NaiveDate,
    pub wagon_sold: i64,
    pub source: UpdateSource,
    pub created_at: DateTime<Utc>,
}

impl DailyUpdate {
    pub fn manual(
        project_id: ProjectId,
        date: NaiveDate,
        wagon_sold: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            project_id,
            date,
            wagon_sold,
            source: UpdateSource::Manual,
            created_at: now,
        }
    }

    /// The delivery record a pullout writes, dated the day of the pullout.
    pub fn from_pullout(project_id: ProjectId, date: NaiveDate, count: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::new(),
            project_id,
            date,
            wagon_sold: i64::from(count),
            source: UpdateSource::Pullout,
            created_at: now,
        }
    }
}
