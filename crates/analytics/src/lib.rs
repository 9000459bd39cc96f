//! `wagonops-analytics` — sales/production plan-vs-achievement analytics.
//!
//! Plan and achievement are two independent sparse collections keyed by
//! (fiscal year, month label, segment). The merge reconciles them into a
//! dense 12-month × 2-segment grid with zero-fill, then derives monthly
//! percentages, quarterly sums and year-level KPIs (including year-over-year
//! growth against a comparison fiscal year).

pub mod fiscal;
pub mod merge;
pub mod rows;

pub use fiscal::FiscalYear;
pub use merge::{Analytics, Compare, Kpis, MonthlyRow, QuarterRow, analytics};
pub use rows::{AchievementRow, PlanRow, Segment};
