//! `wagonops-production` — daily wagon log, pullout rollup, and planning
//! records.
//!
//! The Daily Wagon Log is append-only: one row per submitted daily report
//! and one row per pullout event. History is never edited; running totals
//! (wagons through final inspection, wagons dispatched) are derived by
//! summing the stream, so a pullout is recorded as its own row rather than
//! by mutating earlier ones.

pub mod log;
pub mod planning;
pub mod rollup;
pub mod sales_record;

pub use log::{DailyReport, PDI_STAGE, WagonLogEntry};
pub use planning::MonthlyPlan;
pub use rollup::{Period, PulloutTotals, pullout_totals};
pub use sales_record::{DailyUpdate, UpdateSource};
