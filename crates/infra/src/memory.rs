//! In-memory store for dev/test.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use wagonops_analytics::{AchievementRow, PlanRow};
use wagonops_bom::Bom;
use wagonops_core::{DomainError, ProjectId};
use wagonops_inventory::{LedgerDelta, LedgerSnapshot, ReceiptRecord};
use wagonops_production::{DailyUpdate, MonthlyPlan, WagonLogEntry, pullout_totals};

use crate::store::{OpsStore, StoreError};

#[derive(Default)]
struct State {
    boms: Vec<Bom>,
    ledger: HashMap<(ProjectId, String), i64>,
    receipts: Vec<ReceiptRecord>,
    log: Vec<WagonLogEntry>,
    daily_updates: Vec<DailyUpdate>,
    plans: Vec<MonthlyPlan>,
    sales_plans: Vec<PlanRow>,
    sales_achievements: Vec<AchievementRow>,
}

/// All collections behind one lock, so a multi-step write commits as a unit.
#[derive(Default)]
pub struct InMemoryOpsStore {
    inner: RwLock<State>,
}

impl InMemoryOpsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_deltas(state: &mut State, project_id: &ProjectId, deltas: &[LedgerDelta]) {
    for d in deltas {
        let key = (project_id.clone(), d.part.clone());
        let qty = state.ledger.entry(key).or_insert(0);
        let before = *qty;
        *qty += d.delta;
        if before >= 0 && *qty < 0 {
            tracing::warn!(
                project_id = %project_id,
                part = %d.part,
                quantity = *qty,
                "part ledger balance went negative (consumption ahead of receipts)"
            );
        }
    }
}

fn lock_poisoned() -> StoreError {
    StoreError::backend("store lock poisoned")
}

#[async_trait]
impl OpsStore for InMemoryOpsStore {
    async fn bom_save(&self, bom: Bom) -> Result<Bom, StoreError> {
        let mut state = self.inner.write().map_err(|_| lock_poisoned())?;
        state
            .boms
            .retain(|b| b.wagon_type() != bom.wagon_type());
        state.boms.push(bom.clone());
        Ok(bom)
    }

    async fn bom_find(&self, wagon_type: &str) -> Result<Option<Bom>, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .boms
            .iter()
            .find(|b| b.wagon_type().matches(wagon_type))
            .cloned())
    }

    async fn bom_list(&self) -> Result<Vec<Bom>, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        let mut boms = state.boms.clone();
        boms.sort_by(|a, b| a.wagon_type().as_str().cmp(b.wagon_type().as_str()));
        Ok(boms)
    }

    async fn receipt_commit(
        &self,
        project_id: &ProjectId,
        deltas: Vec<LedgerDelta>,
        records: Vec<ReceiptRecord>,
    ) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| lock_poisoned())?;
        apply_deltas(&mut state, project_id, &deltas);
        state.receipts.extend(records);
        Ok(())
    }

    async fn receipt_log(&self, project_id: &ProjectId) -> Result<Vec<ReceiptRecord>, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        let mut records: Vec<ReceiptRecord> = state
            .receipts
            .iter()
            .filter(|r| r.project_id == *project_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));
        Ok(records)
    }

    async fn ledger_snapshot(&self, project_id: &ProjectId) -> Result<LedgerSnapshot, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .ledger
            .iter()
            .filter(|((p, _), _)| p == project_id)
            .map(|((_, part), qty)| (part.clone(), *qty))
            .collect())
    }

    async fn submit_daily_report(
        &self,
        deltas: Vec<LedgerDelta>,
        entry: WagonLogEntry,
    ) -> Result<WagonLogEntry, StoreError> {
        let mut state = self.inner.write().map_err(|_| lock_poisoned())?;
        let project_id = entry.project_id.clone();
        apply_deltas(&mut state, &project_id, &deltas);
        state.log.push(entry.clone());
        Ok(entry)
    }

    async fn commit_pullout(
        &self,
        entry: WagonLogEntry,
        sale: DailyUpdate,
    ) -> Result<WagonLogEntry, StoreError> {
        let mut state = self.inner.write().map_err(|_| lock_poisoned())?;

        // Availability is rechecked under the same lock that appends, so two
        // concurrent pullouts cannot both pass the guard.
        let ready = pullout_totals(
            state.log.iter().filter(|e| e.project_id == entry.project_id),
            None,
        )
        .ready_for_pullout;
        let requested = i64::from(entry.pullout_done);
        if requested > ready {
            return Err(DomainError::insufficient(requested, ready).into());
        }

        state.log.push(entry.clone());
        state.daily_updates.push(sale);
        Ok(entry)
    }

    async fn wagon_log(&self, project_id: &ProjectId) -> Result<Vec<WagonLogEntry>, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .log
            .iter()
            .filter(|e| e.project_id == *project_id)
            .cloned()
            .collect())
    }

    async fn daily_update_add(&self, update: DailyUpdate) -> Result<DailyUpdate, StoreError> {
        let mut state = self.inner.write().map_err(|_| lock_poisoned())?;
        state.daily_updates.push(update.clone());
        Ok(update)
    }

    async fn daily_updates(&self) -> Result<Vec<DailyUpdate>, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        let mut updates = state.daily_updates.clone();
        updates.sort_by_key(|u| u.date);
        Ok(updates)
    }

    async fn plan_create(&self, plan: MonthlyPlan) -> Result<MonthlyPlan, StoreError> {
        let mut state = self.inner.write().map_err(|_| lock_poisoned())?;
        let duplicate = state.plans.iter().any(|p| {
            p.project_id == plan.project_id && p.year == plan.year && p.month_num == plan.month_num
        });
        if duplicate {
            return Err(DomainError::conflict(format!(
                "plan already exists for {} {}-{:02}",
                plan.project_id, plan.year, plan.month_num
            ))
            .into());
        }
        state.plans.push(plan.clone());
        Ok(plan)
    }

    async fn plan_list(&self) -> Result<Vec<MonthlyPlan>, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        let mut plans = state.plans.clone();
        // Newest first, as the planning view expects.
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    async fn sales_plan_upsert(&self, row: PlanRow) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| lock_poisoned())?;
        state
            .sales_plans
            .retain(|r| !(r.fy == row.fy && r.month == row.month && r.segment == row.segment));
        state.sales_plans.push(row);
        Ok(())
    }

    async fn sales_plans_for_fy(&self, fy: &str) -> Result<Vec<PlanRow>, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .sales_plans
            .iter()
            .filter(|r| r.fy == fy)
            .cloned()
            .collect())
    }

    async fn sales_achievement_upsert(&self, row: AchievementRow) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| lock_poisoned())?;
        state
            .sales_achievements
            .retain(|r| !(r.fy == row.fy && r.month == row.month && r.segment == row.segment));
        state.sales_achievements.push(row);
        Ok(())
    }

    async fn sales_achievements_for_fy(&self, fy: &str) -> Result<Vec<AchievementRow>, StoreError> {
        let state = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .sales_achievements
            .iter()
            .filter(|r| r.fy == fy)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{NaiveDate, Utc};

    use wagonops_core::WagonType;
    use wagonops_inventory::{ReceiptEntry, StockReceipt};
    use wagonops_production::DailyReport;

    use super::*;

    fn project() -> ProjectId {
        ProjectId::new("PRJ-1").unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 14).unwrap()
    }

    fn stock_receipt(parts: &[(&str, i64)]) -> StockReceipt {
        StockReceipt {
            date: date(),
            project_id: project(),
            wagon_type: WagonType::new("BOXN").unwrap(),
            part_entries: parts
                .iter()
                .map(|(name, quantity)| ReceiptEntry {
                    name: (*name).to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
        .validate()
        .unwrap()
    }

    fn report_entry(pdi: u32) -> WagonLogEntry {
        let mut stages = BTreeMap::new();
        if pdi > 0 {
            stages.insert("PDI".to_string(), pdi);
        }
        DailyReport {
            date: date(),
            project_id: project(),
            wagon_type: WagonType::new("BOXN").unwrap(),
            parts_produced: BTreeMap::new(),
            stages_completed: stages,
        }
        .validate()
        .unwrap()
        .into_log_entry(BTreeMap::new(), Utc::now())
    }

    #[tokio::test]
    async fn daily_report_applies_deltas_and_appends_the_row() {
        let store = InMemoryOpsStore::new();
        let deltas = vec![
            LedgerDelta {
                part: "Roof".into(),
                delta: 10,
            },
            LedgerDelta {
                part: "Roof".into(),
                delta: -12,
            },
        ];

        store
            .submit_daily_report(deltas, report_entry(0))
            .await
            .unwrap();

        let snapshot = store.ledger_snapshot(&project()).await.unwrap();
        assert_eq!(snapshot.get("Roof"), Some(&-2));
        assert_eq!(store.wagon_log(&project()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn snapshot_is_stable_without_writes() {
        let store = InMemoryOpsStore::new();
        let receipt = stock_receipt(&[("Axle", 7)]);
        store
            .receipt_commit(&project(), receipt.deltas(), receipt.records(Utc::now()))
            .await
            .unwrap();

        let a = store.ledger_snapshot(&project()).await.unwrap();
        let b = store.ledger_snapshot(&project()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn receipt_commit_leaves_one_audit_row_per_part() {
        let store = InMemoryOpsStore::new();
        let receipt = stock_receipt(&[("Roof", 20), ("Axle", 8)]);
        store
            .receipt_commit(&project(), receipt.deltas(), receipt.records(Utc::now()))
            .await
            .unwrap();

        let snapshot = store.ledger_snapshot(&project()).await.unwrap();
        assert_eq!(snapshot.get("Roof"), Some(&20));

        // The balance alone is not the record: each part comes back as an
        // audit row with the receipt's date and wagon type.
        let log = store.receipt_log(&project()).await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().any(|r| r.part == "Roof" && r.quantity == 20));
        assert!(log.iter().any(|r| r.part == "Axle" && r.quantity == 8));
        assert!(log.iter().all(|r| r.date == date()));

        let other = ProjectId::new("PRJ-2").unwrap();
        assert!(store.receipt_log(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pullout_is_rejected_beyond_availability_and_leaves_no_row() {
        let store = InMemoryOpsStore::new();
        store
            .submit_daily_report(vec![], report_entry(10))
            .await
            .unwrap();
        let pullout = |count| {
            (
                WagonLogEntry::pullout(project(), date(), count, Utc::now()),
                DailyUpdate::from_pullout(project(), date(), count, Utc::now()),
            )
        };

        let (entry, sale) = pullout(3);
        store.commit_pullout(entry, sale).await.unwrap();

        let (entry, sale) = pullout(7);
        store.commit_pullout(entry, sale).await.unwrap();

        let (entry, sale) = pullout(1);
        let err = store.commit_pullout(entry, sale).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::Insufficient {
                requested: 1,
                available: 0
            })
        ));

        // Rejected pullouts append nothing.
        let entries = store.wagon_log(&project()).await.unwrap();
        assert_eq!(entries.len(), 3);
        let totals = pullout_totals(&entries, None);
        assert_eq!(totals.ready_for_pullout, 0);
        // Two sale records were written by the successful pullouts.
        assert_eq!(store.daily_updates().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bom_save_replaces_case_insensitively() {
        let store = InMemoryOpsStore::new();
        let bom = |name: &str| {
            Bom::new(WagonType::new(name).unwrap(), vec![], vec![]).unwrap()
        };

        store.bom_save(bom("BOXN")).await.unwrap();
        store.bom_save(bom("boxn")).await.unwrap();

        assert_eq!(store.bom_list().await.unwrap().len(), 1);
        assert!(store.bom_find(" Boxn ").await.unwrap().is_some());
        assert!(store.bom_find("BCNA").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_monthly_plan_conflicts() {
        let store = InMemoryOpsStore::new();
        let plan = MonthlyPlan {
            id: wagonops_core::EntryId::new(),
            project_id: project(),
            client_name: None,
            client_type: None,
            wagon_type: None,
            month: "2025-09".into(),
            month_num: 9,
            year: 2025,
            monthly_target: 50,
            created_at: Utc::now(),
        };

        store.plan_create(plan.clone()).await.unwrap();
        let err = store
            .plan_create(MonthlyPlan {
                id: wagonops_core::EntryId::new(),
                ..plan
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn sales_rows_upsert_last_write_wins() {
        let store = InMemoryOpsStore::new();
        let row = |plan| PlanRow {
            fy: "2025-26".into(),
            month: "Apr'25".into(),
            segment: wagonops_analytics::Segment::IR,
            plan,
        };

        store.sales_plan_upsert(row(100)).await.unwrap();
        store.sales_plan_upsert(row(150)).await.unwrap();

        let rows = store.sales_plans_for_fy("2025-26").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plan, 150);
    }
}
