use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use wagonops_core::{DomainError, DomainResult, EntryId, ProjectId, WagonType};

/// Full Part Ledger state for one project: part name → current quantity.
pub type LedgerSnapshot = BTreeMap<String, i64>;

/// One signed adjustment to a (project, part) counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDelta {
    pub part: String,
    pub delta: i64,
}

/// Positive ledger adjustments for parts produced in a daily report.
///
/// Empty part names and zero quantities carry no information and are dropped.
pub fn produce_deltas(parts_produced: &BTreeMap<String, i64>) -> Vec<LedgerDelta> {
    parts_produced
        .iter()
        .filter(|(name, qty)| !name.trim().is_empty() && **qty != 0)
        .map(|(name, qty)| LedgerDelta {
            part: name.trim().to_string(),
            delta: *qty,
        })
        .collect()
}

/// Negative ledger adjustments for parts consumed by stage completions.
pub fn consume_deltas(parts_consumed: &BTreeMap<String, i64>) -> Vec<LedgerDelta> {
    parts_consumed
        .iter()
        .filter(|(name, qty)| !name.trim().is_empty() && **qty != 0)
        .map(|(name, qty)| LedgerDelta {
            part: name.trim().to_string(),
            delta: -*qty,
        })
        .collect()
}

/// A manual stock-in: parts delivered to a project outside the daily-report
/// flow (goods receipt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReceipt {
    pub date: NaiveDate,
    pub project_id: ProjectId,
    pub wagon_type: WagonType,
    pub part_entries: Vec<ReceiptEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEntry {
    pub name: String,
    pub quantity: i64,
}

impl StockReceipt {
    /// Validate and normalize: entries need a non-empty part name and a
    /// positive quantity.
    pub fn validate(mut self) -> DomainResult<Self> {
        self.part_entries = self
            .part_entries
            .into_iter()
            .filter_map(|e| {
                let name = e.name.trim().to_string();
                (!name.is_empty()).then_some(ReceiptEntry {
                    name,
                    quantity: e.quantity,
                })
            })
            .collect();

        if self.part_entries.is_empty() {
            return Err(DomainError::validation("partEntries cannot be empty"));
        }
        if let Some(bad) = self.part_entries.iter().find(|e| e.quantity <= 0) {
            return Err(DomainError::validation(format!(
                "quantity for part '{}' must be positive",
                bad.name
            )));
        }
        Ok(self)
    }

    /// Ledger adjustments this receipt applies.
    pub fn deltas(&self) -> Vec<LedgerDelta> {
        self.part_entries
            .iter()
            .map(|e| LedgerDelta {
                part: e.name.clone(),
                delta: e.quantity,
            })
            .collect()
    }

    /// Audit rows this receipt appends, one per part entry.
    pub fn records(&self, recorded_at: DateTime<Utc>) -> Vec<ReceiptRecord> {
        self.part_entries
            .iter()
            .map(|e| ReceiptRecord {
                id: EntryId::new(),
                date: self.date,
                project_id: self.project_id.clone(),
                wagon_type: self.wagon_type.clone(),
                part: e.name.clone(),
                quantity: e.quantity,
                created_at: recorded_at,
            })
            .collect()
    }
}

/// Append-only audit row for a stock receipt. The ledger keeps only the
/// running balance; these rows are what make a receipt recoverable later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    pub id: EntryId,
    pub date: NaiveDate,
    pub project_id: ProjectId,
    pub wagon_type: WagonType,
    pub part: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produce_deltas_are_positive_and_trimmed() {
        let mut produced = BTreeMap::new();
        produced.insert(" Roof ".to_string(), 5);
        produced.insert("  ".to_string(), 3);
        produced.insert("Axle".to_string(), 0);

        let deltas = produce_deltas(&produced);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].part, "Roof");
        assert_eq!(deltas[0].delta, 5);
    }

    #[test]
    fn consume_deltas_negate_quantities() {
        let mut consumed = BTreeMap::new();
        consumed.insert("Roof".to_string(), 12);

        let deltas = consume_deltas(&consumed);
        assert_eq!(deltas[0].delta, -12);
    }

    #[test]
    fn receipt_requires_positive_quantities() {
        let receipt = StockReceipt {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            project_id: ProjectId::new("PRJ-1").unwrap(),
            wagon_type: WagonType::new("BOXN").unwrap(),
            part_entries: vec![ReceiptEntry {
                name: "Roof".into(),
                quantity: 0,
            }],
        };
        assert!(receipt.validate().is_err());
    }

    #[test]
    fn receipt_records_carry_one_audit_row_per_part() {
        let receipt = StockReceipt {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            project_id: ProjectId::new("PRJ-1").unwrap(),
            wagon_type: WagonType::new("BOXN").unwrap(),
            part_entries: vec![
                ReceiptEntry {
                    name: "Roof".into(),
                    quantity: 20,
                },
                ReceiptEntry {
                    name: "Axle".into(),
                    quantity: 8,
                },
            ],
        }
        .validate()
        .unwrap();

        let now = chrono::Utc::now();
        let records = receipt.records(now);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.project_id == receipt.project_id
            && r.date == receipt.date
            && r.created_at == now));
        assert_eq!(records[0].part, "Roof");
        assert_eq!(records[0].quantity, 20);
        assert_eq!(records[1].part, "Axle");
        assert_eq!(records[1].quantity, 8);
    }

    #[test]
    fn receipt_with_no_usable_entries_is_rejected() {
        let receipt = StockReceipt {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            project_id: ProjectId::new("PRJ-1").unwrap(),
            wagon_type: WagonType::new("BOXN").unwrap(),
            part_entries: vec![ReceiptEntry {
                name: "   ".into(),
                quantity: 4,
            }],
        };
        assert!(receipt.validate().is_err());
    }
}
