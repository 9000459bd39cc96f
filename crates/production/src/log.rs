use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use wagonops_core::{DomainError, DomainResult, EntryId, ProjectId, WagonType};

/// Name of the terminal quality-inspection stage. Wagons completing this
/// stage are ready for pullout.
pub const PDI_STAGE: &str = "PDI";

/// One row of the append-only Daily Wagon Log.
///
/// Daily-report rows record produced/consumed parts and stage completions;
/// `ready_for_pullout` mirrors `pdi_count` at creation time. Pullout rows
/// carry only `pullout_done` so that summing the stream yields correct
/// running totals without touching prior rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagonLogEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub project_id: ProjectId,
    pub wagon_type: Option<WagonType>,
    pub parts_produced: BTreeMap<String, i64>,
    pub stages_completed: BTreeMap<String, u32>,
    pub parts_consumed: BTreeMap<String, i64>,
    pub pdi_count: u32,
    pub ready_for_pullout: u32,
    pub pullout_done: u32,
    pub created_at: DateTime<Utc>,
}

impl WagonLogEntry {
    /// Log row for a pullout event: all production counters zero, only
    /// `pullout_done` set.
    pub fn pullout(project_id: ProjectId, date: NaiveDate, count: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::new(),
            date,
            project_id,
            wagon_type: None,
            parts_produced: BTreeMap::new(),
            stages_completed: BTreeMap::new(),
            parts_consumed: BTreeMap::new(),
            pdi_count: 0,
            ready_for_pullout: 0,
            pullout_done: count,
            created_at: now,
        }
    }
}

/// A submitted daily production report, before BOM consumption has been
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: NaiveDate,
    pub project_id: ProjectId,
    pub wagon_type: WagonType,
    #[serde(default)]
    pub parts_produced: BTreeMap<String, i64>,
    #[serde(default)]
    pub stages_completed: BTreeMap<String, u32>,
}

impl DailyReport {
    /// Validate and normalize the report: part/stage names are trimmed and
    /// empty keys dropped; produced quantities must not be negative.
    pub fn validate(mut self) -> DomainResult<Self> {
        let mut produced = BTreeMap::new();
        for (name, qty) in self.parts_produced {
            let name = name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            if qty < 0 {
                return Err(DomainError::validation(format!(
                    "partsProduced['{name}'] cannot be negative"
                )));
            }
            if qty > 0 {
                produced.insert(name, qty);
            }
        }
        self.parts_produced = produced;

        let mut stages = BTreeMap::new();
        for (name, count) in self.stages_completed {
            let name = name.trim().to_string();
            if name.is_empty() || count == 0 {
                continue;
            }
            stages.insert(name, count);
        }
        self.stages_completed = stages;

        Ok(self)
    }

    /// Wagons that finished the terminal inspection stage in this report.
    pub fn pdi_count(&self) -> u32 {
        self.stages_completed.get(PDI_STAGE).copied().unwrap_or(0)
    }

    /// Materialize the log row for this report once consumption has been
    /// computed against the project's BOM.
    pub fn into_log_entry(
        self,
        parts_consumed: BTreeMap<String, i64>,
        now: DateTime<Utc>,
    ) -> WagonLogEntry {
        let pdi_count = self.pdi_count();
        WagonLogEntry {
            id: EntryId::new(),
            date: self.date,
            project_id: self.project_id,
            wagon_type: Some(self.wagon_type),
            parts_produced: self.parts_produced,
            stages_completed: self.stages_completed,
            parts_consumed,
            pdi_count,
            // Mirrors pdi_count at creation time, by convention.
            ready_for_pullout: pdi_count,
            pullout_done: 0,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> DailyReport {
        let mut stages = BTreeMap::new();
        stages.insert("Boxing".to_string(), 3);
        stages.insert("PDI".to_string(), 2);

        let mut produced = BTreeMap::new();
        produced.insert("Roof".to_string(), 10);

        DailyReport {
            date: NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(),
            project_id: ProjectId::new("PRJ-1").unwrap(),
            wagon_type: WagonType::new("BOXN").unwrap(),
            parts_produced: produced,
            stages_completed: stages,
        }
    }

    #[test]
    fn pdi_count_reads_the_terminal_stage() {
        assert_eq!(report().pdi_count(), 2);
    }

    #[test]
    fn log_entry_mirrors_pdi_into_ready_for_pullout() {
        let entry = report()
            .validate()
            .unwrap()
            .into_log_entry(BTreeMap::new(), Utc::now());
        assert_eq!(entry.pdi_count, 2);
        assert_eq!(entry.ready_for_pullout, 2);
        assert_eq!(entry.pullout_done, 0);
    }

    #[test]
    fn negative_produced_quantity_is_rejected() {
        let mut r = report();
        r.parts_produced.insert("Axle".to_string(), -1);
        assert!(r.validate().is_err());
    }

    #[test]
    fn empty_keys_and_zero_counts_are_dropped() {
        let mut r = report();
        r.stages_completed.insert("  ".to_string(), 9);
        r.stages_completed.insert("Painting".to_string(), 0);
        let r = r.validate().unwrap();
        assert_eq!(r.stages_completed.len(), 2);
    }

    #[test]
    fn pullout_row_has_only_pullout_done_set() {
        let entry = WagonLogEntry::pullout(
            ProjectId::new("PRJ-1").unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
            5,
            Utc::now(),
        );
        assert_eq!(entry.pdi_count, 0);
        assert_eq!(entry.ready_for_pullout, 0);
        assert_eq!(entry.pullout_done, 5);
        assert!(entry.wagon_type.is_none());
    }
}
