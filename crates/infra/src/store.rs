//! Store trait and error taxonomy.

use async_trait::async_trait;
use thiserror::Error;

use wagonops_analytics::{AchievementRow, PlanRow};
use wagonops_bom::Bom;
use wagonops_core::{DomainError, ProjectId};
use wagonops_inventory::{LedgerDelta, LedgerSnapshot, ReceiptRecord};
use wagonops_production::{DailyUpdate, MonthlyPlan, WagonLogEntry};

/// Storage-layer error.
///
/// Deterministic business failures surface as [`StoreError::Domain`] so the
/// HTTP layer can map them to 4xx; everything else is a backend failure
/// (500). A 500 from a multi-step endpoint means "state unknown, re-verify
/// via a read" — there are no automatic retries or compensations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// The one store surface over all collections.
///
/// Contract notes:
/// - `receipt_commit` applies the ledger adjustments and appends the receipt
///   audit rows atomically; a receipt is never counted without being
///   recoverable from the log.
/// - `submit_daily_report` commits the ledger adjustments and the log row
///   atomically; nothing is applied if the commit fails.
/// - `commit_pullout` revalidates availability (via the shared rollup)
///   inside the same commit that appends the pullout row and the derived
///   sale record, and rejects with `DomainError::Insufficient` otherwise.
/// - `bom_find` is a case-insensitive exact match on the trimmed name.
/// - `sales_plan_upsert`/`sales_achievement_upsert` are last-write-wins per
///   (fy, month, segment); no history is kept.
#[async_trait]
pub trait OpsStore: Send + Sync {
    // Bill of Materials
    async fn bom_save(&self, bom: Bom) -> Result<Bom, StoreError>;
    async fn bom_find(&self, wagon_type: &str) -> Result<Option<Bom>, StoreError>;
    async fn bom_list(&self) -> Result<Vec<Bom>, StoreError>;

    // Part Ledger
    async fn receipt_commit(
        &self,
        project_id: &ProjectId,
        deltas: Vec<LedgerDelta>,
        records: Vec<ReceiptRecord>,
    ) -> Result<(), StoreError>;
    async fn receipt_log(&self, project_id: &ProjectId) -> Result<Vec<ReceiptRecord>, StoreError>;
    async fn ledger_snapshot(&self, project_id: &ProjectId) -> Result<LedgerSnapshot, StoreError>;

    // Daily Wagon Log
    async fn submit_daily_report(
        &self,
        deltas: Vec<LedgerDelta>,
        entry: WagonLogEntry,
    ) -> Result<WagonLogEntry, StoreError>;
    async fn commit_pullout(
        &self,
        entry: WagonLogEntry,
        sale: DailyUpdate,
    ) -> Result<WagonLogEntry, StoreError>;
    async fn wagon_log(&self, project_id: &ProjectId) -> Result<Vec<WagonLogEntry>, StoreError>;

    // Daily sale/delivery updates
    async fn daily_update_add(&self, update: DailyUpdate) -> Result<DailyUpdate, StoreError>;
    async fn daily_updates(&self) -> Result<Vec<DailyUpdate>, StoreError>;

    // Monthly planning
    async fn plan_create(&self, plan: MonthlyPlan) -> Result<MonthlyPlan, StoreError>;
    async fn plan_list(&self) -> Result<Vec<MonthlyPlan>, StoreError>;

    // Sales/production analytics inputs
    async fn sales_plan_upsert(&self, row: PlanRow) -> Result<(), StoreError>;
    async fn sales_plans_for_fy(&self, fy: &str) -> Result<Vec<PlanRow>, StoreError>;
    async fn sales_achievement_upsert(&self, row: AchievementRow) -> Result<(), StoreError>;
    async fn sales_achievements_for_fy(&self, fy: &str) -> Result<Vec<AchievementRow>, StoreError>;
}
