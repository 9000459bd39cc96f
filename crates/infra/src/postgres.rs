//! Postgres-backed operations store.
//!
//! Domain records with nested maps (BOMs, wagon-log rows, monthly plans)
//! are stored as JSONB documents next to the columns the queries filter
//! on; flat rows (the part ledger, sales plan/achievement rows) get real
//! columns. Multi-step writes run in a transaction, and the pullout
//! availability check holds a per-project advisory lock so two concurrent
//! pullouts cannot both pass the guard.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};

use wagonops_analytics::{AchievementRow, PlanRow, Segment};
use wagonops_bom::Bom;
use wagonops_core::{DomainError, ProjectId};
use wagonops_inventory::{LedgerDelta, LedgerSnapshot, ReceiptRecord};
use wagonops_production::{DailyUpdate, MonthlyPlan, UpdateSource, WagonLogEntry, pullout_totals};

use crate::store::{OpsStore, StoreError};

#[derive(Debug, Clone)]
pub struct PostgresOpsStore {
    pool: Arc<PgPool>,
}

impl PostgresOpsStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and create any missing tables.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::backend(format!("connect: {e}")))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        const DDL: &[&str] = &[
            r#"
            CREATE TABLE IF NOT EXISTS wagon_boms (
                wagon_type TEXT PRIMARY KEY,
                doc JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS wagon_boms_wagon_type_lower
                ON wagon_boms (LOWER(wagon_type))
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS part_ledger (
                project_id TEXT NOT NULL,
                part TEXT NOT NULL,
                quantity BIGINT NOT NULL DEFAULT 0,
                PRIMARY KEY (project_id, part)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS part_receipt_log (
                id UUID PRIMARY KEY,
                receipt_date DATE NOT NULL,
                project_id TEXT NOT NULL,
                wagon_type TEXT NOT NULL,
                part TEXT NOT NULL,
                quantity BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS part_receipt_log_project
                ON part_receipt_log (project_id, receipt_date)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS wagon_log (
                id UUID PRIMARY KEY,
                project_id TEXT NOT NULL,
                entry_date DATE NOT NULL,
                entry JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS wagon_log_project
                ON wagon_log (project_id, entry_date)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS daily_updates (
                id UUID PRIMARY KEY,
                project_id TEXT NOT NULL,
                update_date DATE NOT NULL,
                wagon_sold BIGINT NOT NULL,
                source TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS monthly_plans (
                id UUID PRIMARY KEY,
                project_id TEXT NOT NULL,
                year INT NOT NULL,
                month_num INT NOT NULL,
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                UNIQUE (project_id, year, month_num)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS sales_prod_plans (
                fy TEXT NOT NULL,
                month TEXT NOT NULL,
                segment TEXT NOT NULL,
                plan BIGINT NOT NULL,
                PRIMARY KEY (fy, month, segment)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS sales_prod_achievements (
                fy TEXT NOT NULL,
                month TEXT NOT NULL,
                segment TEXT NOT NULL,
                achieved BIGINT NOT NULL,
                PRIMARY KEY (fy, month, segment)
            )
            "#,
        ];

        for ddl in DDL {
            sqlx::query(ddl)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

/// Map SQLx errors onto the store error taxonomy. Unique violations
/// (`23505`) become domain conflicts; everything else is a backend fault.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return DomainError::conflict(format!(
                "duplicate key in {operation}: {}",
                db_err.message()
            ))
            .into();
        }
    }
    StoreError::backend(format!("{operation}: {err}"))
}

fn decode<T: serde::de::DeserializeOwned>(
    operation: &str,
    doc: serde_json::Value,
) -> Result<T, StoreError> {
    serde_json::from_value(doc)
        .map_err(|e| StoreError::backend(format!("{operation}: bad stored document: {e}")))
}

fn encode<T: serde::Serialize>(operation: &str, value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value)
        .map_err(|e| StoreError::backend(format!("{operation}: encode document: {e}")))
}

/// Apply ledger deltas inside a transaction, one upsert per part.
async fn apply_deltas_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: &ProjectId,
    deltas: &[LedgerDelta],
) -> Result<(), StoreError> {
    for d in deltas {
        let row = sqlx::query(
            r#"
            INSERT INTO part_ledger (project_id, part, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, part)
            DO UPDATE SET quantity = part_ledger.quantity + EXCLUDED.quantity
            RETURNING quantity
            "#,
        )
        .bind(project_id.as_str())
        .bind(&d.part)
        .bind(d.delta)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("ledger_apply", e))?;

        let quantity: i64 = row
            .try_get("quantity")
            .map_err(|e| StoreError::backend(format!("ledger_apply: read quantity: {e}")))?;
        if quantity < 0 && quantity - d.delta >= 0 {
            tracing::warn!(
                project_id = %project_id,
                part = %d.part,
                quantity,
                "part ledger balance went negative (consumption ahead of receipts)"
            );
        }
    }
    Ok(())
}

async fn insert_log_entry_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry: &WagonLogEntry,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO wagon_log (id, project_id, entry_date, entry, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.project_id.as_str())
    .bind(entry.date)
    .bind(encode("wagon_log", entry)?)
    .bind(entry.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("wagon_log_insert", e))?;
    Ok(())
}

async fn insert_daily_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    update: &DailyUpdate,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO daily_updates (id, project_id, update_date, wagon_sold, source, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(update.id.as_uuid())
    .bind(update.project_id.as_str())
    .bind(update.date)
    .bind(update.wagon_sold)
    .bind(source_str(update.source))
    .bind(update.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("daily_update_insert", e))?;
    Ok(())
}

fn begin_err(e: sqlx::Error) -> StoreError {
    map_sqlx_error("begin", e)
}

fn commit_err(e: sqlx::Error) -> StoreError {
    map_sqlx_error("commit", e)
}

#[async_trait]
impl OpsStore for PostgresOpsStore {
    async fn bom_save(&self, bom: Bom) -> Result<Bom, StoreError> {
        // Delete + insert in one transaction so re-saving "boxn" replaces
        // "BOXN" instead of tripping the case-insensitive unique index.
        let mut tx = self.pool.begin().await.map_err(begin_err)?;

        sqlx::query("DELETE FROM wagon_boms WHERE LOWER(wagon_type) = LOWER($1)")
            .bind(bom.wagon_type().as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("bom_save", e))?;

        sqlx::query(
            r#"
            INSERT INTO wagon_boms (wagon_type, doc, updated_at)
            VALUES ($1, $2, NOW())
            "#,
        )
        .bind(bom.wagon_type().as_str())
        .bind(encode("bom_save", &bom)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("bom_save", e))?;

        tx.commit().await.map_err(commit_err)?;
        Ok(bom)
    }

    async fn bom_find(&self, wagon_type: &str) -> Result<Option<Bom>, StoreError> {
        let row = sqlx::query(
            "SELECT doc FROM wagon_boms WHERE LOWER(wagon_type) = LOWER($1)",
        )
        .bind(wagon_type.trim())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("bom_find", e))?;

        match row {
            Some(row) => {
                let doc: serde_json::Value = row
                    .try_get("doc")
                    .map_err(|e| StoreError::backend(format!("bom_find: read doc: {e}")))?;
                Ok(Some(decode("bom_find", doc)?))
            }
            None => Ok(None),
        }
    }

    async fn bom_list(&self) -> Result<Vec<Bom>, StoreError> {
        let rows = sqlx::query("SELECT doc FROM wagon_boms ORDER BY wagon_type ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("bom_list", e))?;

        let mut boms = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: serde_json::Value = row
                .try_get("doc")
                .map_err(|e| StoreError::backend(format!("bom_list: read doc: {e}")))?;
            boms.push(decode("bom_list", doc)?);
        }
        Ok(boms)
    }

    async fn receipt_commit(
        &self,
        project_id: &ProjectId,
        deltas: Vec<LedgerDelta>,
        records: Vec<ReceiptRecord>,
    ) -> Result<(), StoreError> {
        // Balance and audit rows land in the same transaction; a receipt is
        // never counted without being recoverable from the log.
        let mut tx = self.pool.begin().await.map_err(begin_err)?;
        apply_deltas_tx(&mut tx, project_id, &deltas).await?;
        for r in &records {
            sqlx::query(
                r#"
                INSERT INTO part_receipt_log
                    (id, receipt_date, project_id, wagon_type, part, quantity, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(r.id.as_uuid())
            .bind(r.date)
            .bind(r.project_id.as_str())
            .bind(r.wagon_type.as_str())
            .bind(&r.part)
            .bind(r.quantity)
            .bind(r.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("receipt_commit", e))?;
        }
        tx.commit().await.map_err(commit_err)
    }

    async fn receipt_log(&self, project_id: &ProjectId) -> Result<Vec<ReceiptRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, receipt_date, project_id, wagon_type, part, quantity, created_at
            FROM part_receipt_log
            WHERE project_id = $1
            ORDER BY receipt_date ASC, created_at ASC
            "#,
        )
        .bind(project_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("receipt_log", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(receipt_record_from_row(&row)?);
        }
        Ok(records)
    }

    async fn ledger_snapshot(&self, project_id: &ProjectId) -> Result<LedgerSnapshot, StoreError> {
        let rows = sqlx::query(
            "SELECT part, quantity FROM part_ledger WHERE project_id = $1",
        )
        .bind(project_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ledger_snapshot", e))?;

        let mut snapshot = LedgerSnapshot::new();
        for row in rows {
            let part: String = row
                .try_get("part")
                .map_err(|e| StoreError::backend(format!("ledger_snapshot: read part: {e}")))?;
            let quantity: i64 = row
                .try_get("quantity")
                .map_err(|e| StoreError::backend(format!("ledger_snapshot: read quantity: {e}")))?;
            snapshot.insert(part, quantity);
        }
        Ok(snapshot)
    }

    async fn submit_daily_report(
        &self,
        deltas: Vec<LedgerDelta>,
        entry: WagonLogEntry,
    ) -> Result<WagonLogEntry, StoreError> {
        let mut tx = self.pool.begin().await.map_err(begin_err)?;
        apply_deltas_tx(&mut tx, &entry.project_id, &deltas).await?;
        insert_log_entry_tx(&mut tx, &entry).await?;
        tx.commit().await.map_err(commit_err)?;
        Ok(entry)
    }

    async fn commit_pullout(
        &self,
        entry: WagonLogEntry,
        sale: DailyUpdate,
    ) -> Result<WagonLogEntry, StoreError> {
        let mut tx = self.pool.begin().await.map_err(begin_err)?;

        // Serialize pullouts per project for the duration of the
        // transaction; plain row locks would not block a concurrent insert.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(entry.project_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("commit_pullout", e))?;

        let rows = sqlx::query("SELECT entry FROM wagon_log WHERE project_id = $1")
            .bind(entry.project_id.as_str())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("commit_pullout", e))?;

        let mut existing = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: serde_json::Value = row
                .try_get("entry")
                .map_err(|e| StoreError::backend(format!("commit_pullout: read entry: {e}")))?;
            existing.push(decode::<WagonLogEntry>("commit_pullout", doc)?);
        }

        let ready = pullout_totals(&existing, None).ready_for_pullout;
        let requested = i64::from(entry.pullout_done);
        if requested > ready {
            return Err(DomainError::insufficient(requested, ready).into());
        }

        insert_log_entry_tx(&mut tx, &entry).await?;
        insert_daily_update_tx(&mut tx, &sale).await?;
        tx.commit().await.map_err(commit_err)?;
        Ok(entry)
    }

    async fn wagon_log(&self, project_id: &ProjectId) -> Result<Vec<WagonLogEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT entry FROM wagon_log
            WHERE project_id = $1
            ORDER BY entry_date ASC, created_at ASC
            "#,
        )
        .bind(project_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("wagon_log", e))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: serde_json::Value = row
                .try_get("entry")
                .map_err(|e| StoreError::backend(format!("wagon_log: read entry: {e}")))?;
            entries.push(decode("wagon_log", doc)?);
        }
        Ok(entries)
    }

    async fn daily_update_add(&self, update: DailyUpdate) -> Result<DailyUpdate, StoreError> {
        let mut tx = self.pool.begin().await.map_err(begin_err)?;
        insert_daily_update_tx(&mut tx, &update).await?;
        tx.commit().await.map_err(commit_err)?;
        Ok(update)
    }

    async fn daily_updates(&self) -> Result<Vec<DailyUpdate>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, project_id, update_date, wagon_sold, source, created_at
            FROM daily_updates
            ORDER BY update_date ASC, created_at ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("daily_updates", e))?;

        let mut updates = Vec::with_capacity(rows.len());
        for row in rows {
            updates.push(daily_update_from_row(&row)?);
        }
        Ok(updates)
    }

    async fn plan_create(&self, plan: MonthlyPlan) -> Result<MonthlyPlan, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO monthly_plans (id, project_id, year, month_num, doc, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(plan.id.as_uuid())
        .bind(plan.project_id.as_str())
        .bind(plan.year)
        .bind(plan.month_num as i32)
        .bind(encode("plan_create", &plan)?)
        .bind(plan.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("plan_create", e))?;
        Ok(plan)
    }

    async fn plan_list(&self) -> Result<Vec<MonthlyPlan>, StoreError> {
        let rows = sqlx::query("SELECT doc FROM monthly_plans ORDER BY created_at DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("plan_list", e))?;

        let mut plans = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: serde_json::Value = row
                .try_get("doc")
                .map_err(|e| StoreError::backend(format!("plan_list: read doc: {e}")))?;
            plans.push(decode("plan_list", doc)?);
        }
        Ok(plans)
    }

    async fn sales_plan_upsert(&self, row: PlanRow) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sales_prod_plans (fy, month, segment, plan)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (fy, month, segment)
            DO UPDATE SET plan = EXCLUDED.plan
            "#,
        )
        .bind(&row.fy)
        .bind(&row.month)
        .bind(row.segment.as_str())
        .bind(row.plan)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("sales_plan_upsert", e))?;
        Ok(())
    }

    async fn sales_plans_for_fy(&self, fy: &str) -> Result<Vec<PlanRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT fy, month, segment, plan FROM sales_prod_plans WHERE fy = $1",
        )
        .bind(fy)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("sales_plans_for_fy", e))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(PlanRow {
                fy: try_col(&row, "fy")?,
                month: try_col(&row, "month")?,
                segment: segment_col(&row)?,
                plan: try_col(&row, "plan")?,
            });
        }
        Ok(out)
    }

    async fn sales_achievement_upsert(&self, row: AchievementRow) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sales_prod_achievements (fy, month, segment, achieved)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (fy, month, segment)
            DO UPDATE SET achieved = EXCLUDED.achieved
            "#,
        )
        .bind(&row.fy)
        .bind(&row.month)
        .bind(row.segment.as_str())
        .bind(row.achieved)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("sales_achievement_upsert", e))?;
        Ok(())
    }

    async fn sales_achievements_for_fy(&self, fy: &str) -> Result<Vec<AchievementRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT fy, month, segment, achieved FROM sales_prod_achievements WHERE fy = $1",
        )
        .bind(fy)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("sales_achievements_for_fy", e))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(AchievementRow {
                fy: try_col(&row, "fy")?,
                month: try_col(&row, "month")?,
                segment: segment_col(&row)?,
                achieved: try_col(&row, "achieved")?,
            });
        }
        Ok(out)
    }
}

fn try_col<'r, T>(row: &'r sqlx::postgres::PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::backend(format!("read column '{name}': {e}")))
}

fn segment_col(row: &sqlx::postgres::PgRow) -> Result<Segment, StoreError> {
    let raw: String = try_col(row, "segment")?;
    Segment::parse(&raw).map_err(StoreError::Domain)
}

fn source_str(source: UpdateSource) -> &'static str {
    match source {
        UpdateSource::Manual => "manual",
        UpdateSource::Pullout => "pullout",
    }
}

fn receipt_record_from_row(row: &sqlx::postgres::PgRow) -> Result<ReceiptRecord, StoreError> {
    let id: uuid::Uuid = try_col(row, "id")?;
    let project_id: String = try_col(row, "project_id")?;
    let wagon_type: String = try_col(row, "wagon_type")?;
    Ok(ReceiptRecord {
        id: id.into(),
        date: try_col(row, "receipt_date")?,
        project_id: project_id.parse().map_err(StoreError::Domain)?,
        wagon_type: wagon_type.parse().map_err(StoreError::Domain)?,
        part: try_col(row, "part")?,
        quantity: try_col(row, "quantity")?,
        created_at: try_col(row, "created_at")?,
    })
}

fn daily_update_from_row(row: &sqlx::postgres::PgRow) -> Result<DailyUpdate, StoreError> {
    let id: uuid::Uuid = try_col(row, "id")?;
    let project_id: String = try_col(row, "project_id")?;
    let source: String = try_col(row, "source")?;
    let source = match source.as_str() {
        "manual" => UpdateSource::Manual,
        "pullout" => UpdateSource::Pullout,
        other => {
            return Err(StoreError::backend(format!(
                "unknown daily update source '{other}'"
            )));
        }
    };
    Ok(DailyUpdate {
        id: id.into(),
        project_id: project_id
            .parse()
            .map_err(StoreError::Domain)?,
        date: try_col(row, "update_date")?,
        wagon_sold: try_col(row, "wagon_sold")?,
        source,
        created_at: try_col(row, "created_at")?,
    })
}
