//! Plan/achievement merge, zero-fill, quarters and KPIs.

use std::collections::HashMap;

use serde::Serialize;

use crate::fiscal::FiscalYear;
use crate::rows::{AchievementRow, PlanRow, Segment};

/// One cell of the dense month × segment grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRow {
    pub fy: String,
    pub month: String,
    pub segment: Segment,
    pub plan: i64,
    pub achieved: i64,
    /// achieved/plan as a percentage, one decimal, "0.0" when plan is 0.
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterRow {
    pub quarter: String,
    pub plan: i64,
    pub achieved: i64,
    pub percent: String,
}

/// Year-level KPIs. Field names match the dashboard wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub fy: String,
    pub total_plan: i64,
    pub total_achieved: i64,
    pub achievement_percent: String,
    pub ir_percent: String,
    pub pvt_percent: String,
    pub yoy_plan_growth: String,
    pub yoy_ach_growth: String,
    #[serde(rename = "irYoYGrowth")]
    pub ir_yoy_growth: String,
    #[serde(rename = "pvtYoYGrowth")]
    pub pvt_yoy_growth: String,
    pub gap_absolute: i64,
    pub gap_percent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compare {
    pub fy_prev: String,
    pub plan_prev: i64,
    pub ach_prev: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analytics {
    #[serde(rename = "KPIs")]
    pub kpis: Kpis,
    /// Always exactly 24 rows: 12 canonical months × {IR, Pvt}.
    pub monthly: Vec<MonthlyRow>,
    pub quarterly: Vec<QuarterRow>,
    pub compare: Compare,
}

const QUARTERS: [(&str, [&str; 3]); 4] = [
    ("Q1", ["Apr", "May", "Jun"]),
    ("Q2", ["Jul", "Aug", "Sep"]),
    ("Q3", ["Oct", "Nov", "Dec"]),
    ("Q4", ["Jan", "Feb", "Mar"]),
];

/// Format a ratio as a percentage with one decimal. Non-finite values
/// (division by zero, 0/0) render "0.0" rather than Infinity/NaN.
fn safe_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}")
    } else {
        "0.0".to_string()
    }
}

fn pct_of(achieved: i64, plan: i64) -> String {
    if plan == 0 {
        return "0.0".to_string();
    }
    safe_pct(achieved as f64 / plan as f64 * 100.0)
}

fn growth(current: i64, previous: i64) -> String {
    safe_pct((current - previous) as f64 / previous as f64 * 100.0)
}

/// Sparse merged cell before zero-fill.
struct MergedRow {
    month: String,
    segment: Segment,
    plan: i64,
    achieved: i64,
}

/// Merge plan and achievement rows keyed by (month, segment), defaulting
/// missing sides to 0.
fn merge_rows(plans: &[PlanRow], achievements: &[AchievementRow]) -> Vec<MergedRow> {
    let mut map: HashMap<(String, Segment), MergedRow> = HashMap::new();

    for p in plans {
        map.insert(
            (p.month.clone(), p.segment),
            MergedRow {
                month: p.month.clone(),
                segment: p.segment,
                plan: p.plan,
                achieved: 0,
            },
        );
    }
    for a in achievements {
        map.entry((a.month.clone(), a.segment))
            .and_modify(|m| m.achieved = a.achieved)
            .or_insert_with(|| MergedRow {
                month: a.month.clone(),
                segment: a.segment,
                plan: 0,
                achieved: a.achieved,
            });
    }

    // HashMap iteration order is randomized; sort so that when two stored
    // labels share a month abbreviation (say Apr'24 and Apr'25), the slot
    // lookup below resolves the same way on every run.
    let mut rows: Vec<MergedRow> = map.into_values().collect();
    rows.sort_by(|a, b| a.month.cmp(&b.month).then(a.segment.cmp(&b.segment)));
    rows
}

/// Zero-fill the sparse merge into the dense 24-row grid for `fy`.
///
/// A merged row lands in a canonical slot when its three-letter month
/// abbreviation matches, ignoring the year suffix: a plan stored against a
/// stale year label still counts for the right month.
fn fill_missing(merged: &[MergedRow], fy: &FiscalYear) -> Vec<MonthlyRow> {
    let mut filled = Vec::with_capacity(24);

    for month in fy.month_labels() {
        for segment in Segment::ALL {
            let abbrev = &month[..3];
            let found = merged
                .iter()
                .find(|r| r.segment == segment && r.month.get(..3) == Some(abbrev));

            let (plan, achieved) = found.map(|r| (r.plan, r.achieved)).unwrap_or((0, 0));
            filled.push(MonthlyRow {
                fy: fy.label(),
                month: month.clone(),
                segment,
                plan,
                achieved,
                percent: pct_of(achieved, plan),
            });
        }
    }

    filled
}

fn sum_plan(rows: &[MonthlyRow]) -> i64 {
    rows.iter().map(|r| r.plan).sum()
}

fn sum_achieved(rows: &[MonthlyRow]) -> i64 {
    rows.iter().map(|r| r.achieved).sum()
}

fn segment_achieved(rows: &[MonthlyRow], segment: Segment) -> i64 {
    rows.iter()
        .filter(|r| r.segment == segment)
        .map(|r| r.achieved)
        .sum()
}

/// Build the full analytics view for `fy`, compared against `compare_fy`.
pub fn analytics(
    fy: &FiscalYear,
    compare_fy: &FiscalYear,
    plans: &[PlanRow],
    achievements: &[AchievementRow],
    plans_prev: &[PlanRow],
    achievements_prev: &[AchievementRow],
) -> Analytics {
    let current = fill_missing(&merge_rows(plans, achievements), fy);
    let previous = fill_missing(&merge_rows(plans_prev, achievements_prev), compare_fy);

    let cur_plan = sum_plan(&current);
    let cur_ach = sum_achieved(&current);
    let prev_plan = sum_plan(&previous);
    let prev_ach = sum_achieved(&previous);

    let ir_ach = segment_achieved(&current, Segment::IR);
    let pvt_ach = segment_achieved(&current, Segment::Pvt);
    let ir_ach_prev = segment_achieved(&previous, Segment::IR);
    let pvt_ach_prev = segment_achieved(&previous, Segment::Pvt);

    let quarterly = QUARTERS
        .iter()
        .map(|(quarter, months)| {
            let subset: Vec<&MonthlyRow> = current
                .iter()
                .filter(|r| months.iter().any(|m| r.month.starts_with(m)))
                .collect();
            let plan: i64 = subset.iter().map(|r| r.plan).sum();
            let achieved: i64 = subset.iter().map(|r| r.achieved).sum();
            QuarterRow {
                quarter: quarter.to_string(),
                plan,
                achieved,
                percent: pct_of(achieved, plan),
            }
        })
        .collect();

    let kpis = Kpis {
        fy: fy.label(),
        total_plan: cur_plan,
        total_achieved: cur_ach,
        achievement_percent: pct_of(cur_ach, cur_plan),
        ir_percent: pct_of(ir_ach, cur_ach),
        pvt_percent: pct_of(pvt_ach, cur_ach),
        yoy_plan_growth: growth(cur_plan, prev_plan),
        yoy_ach_growth: growth(cur_ach, prev_ach),
        ir_yoy_growth: growth(ir_ach, ir_ach_prev),
        pvt_yoy_growth: growth(pvt_ach, pvt_ach_prev),
        gap_absolute: cur_plan - cur_ach,
        gap_percent: pct_of(cur_plan - cur_ach, cur_plan),
    };

    Analytics {
        kpis,
        monthly: current,
        quarterly,
        compare: Compare {
            fy_prev: compare_fy.label(),
            plan_prev: prev_plan,
            ach_prev: prev_ach,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fy() -> FiscalYear {
        FiscalYear::parse("2025-26").unwrap()
    }

    fn prev_fy() -> FiscalYear {
        FiscalYear::parse("2024-25").unwrap()
    }

    fn plan(month: &str, segment: Segment, plan: i64) -> PlanRow {
        PlanRow {
            fy: "2025-26".into(),
            month: month.into(),
            segment,
            plan,
        }
    }

    fn ach(month: &str, segment: Segment, achieved: i64) -> AchievementRow {
        AchievementRow {
            fy: "2025-26".into(),
            month: month.into(),
            segment,
            achieved,
        }
    }

    #[test]
    fn monthly_grid_is_always_24_rows() {
        let out = analytics(&fy(), &prev_fy(), &[], &[], &[], &[]);
        assert_eq!(out.monthly.len(), 24);
        assert!(out.monthly.iter().all(|r| r.plan == 0 && r.achieved == 0));
        assert_eq!(out.quarterly.len(), 4);
    }

    #[test]
    fn plan_without_achievement_zero_fills_the_achieved_side() {
        let out = analytics(
            &fy(),
            &prev_fy(),
            &[plan("Apr'25", Segment::IR, 100)],
            &[],
            &[],
            &[],
        );

        let row = out
            .monthly
            .iter()
            .find(|r| r.month == "Apr'25" && r.segment == Segment::IR)
            .unwrap();
        assert_eq!(row.plan, 100);
        assert_eq!(row.achieved, 0);
        assert_eq!(row.percent, "0.0");
    }

    #[test]
    fn stale_year_suffix_still_lands_in_the_right_slot() {
        // Plan entered with last year's label; fy 2025-26 canonical slot is Apr'25.
        let out = analytics(
            &fy(),
            &prev_fy(),
            &[plan("Apr'24", Segment::Pvt, 40)],
            &[ach("Apr'24", Segment::Pvt, 30)],
            &[],
            &[],
        );

        let row = out
            .monthly
            .iter()
            .find(|r| r.month == "Apr'25" && r.segment == Segment::Pvt)
            .unwrap();
        assert_eq!(row.plan, 40);
        assert_eq!(row.achieved, 30);
        assert_eq!(row.percent, "75.0");
    }

    #[test]
    fn colliding_month_labels_resolve_to_the_same_slot_every_time() {
        // Both labels are live rows for fy 2025-26 (the upsert key is the
        // full label), and both match the Apr slot by abbreviation. The
        // earlier label must win deterministically.
        let plans = [
            plan("Apr'25", Segment::IR, 70),
            plan("Apr'24", Segment::IR, 40),
        ];

        for _ in 0..16 {
            let out = analytics(&fy(), &prev_fy(), &plans, &[], &[], &[]);
            let row = out
                .monthly
                .iter()
                .find(|r| r.month == "Apr'25" && r.segment == Segment::IR)
                .unwrap();
            assert_eq!(row.plan, 40);
        }
    }

    #[test]
    fn quarters_sum_their_months() {
        let out = analytics(
            &fy(),
            &prev_fy(),
            &[
                plan("Apr'25", Segment::IR, 10),
                plan("Jun'25", Segment::IR, 20),
                plan("Jul'25", Segment::IR, 5),
            ],
            &[ach("Apr'25", Segment::IR, 15)],
            &[],
            &[],
        );

        let q1 = &out.quarterly[0];
        assert_eq!(q1.quarter, "Q1");
        assert_eq!(q1.plan, 30);
        assert_eq!(q1.achieved, 15);
        assert_eq!(q1.percent, "50.0");

        let q2 = &out.quarterly[1];
        assert_eq!(q2.plan, 5);
        assert_eq!(q2.achieved, 0);
    }

    #[test]
    fn growth_guard_renders_zero_when_prior_year_is_zero() {
        let out = analytics(
            &fy(),
            &prev_fy(),
            &[],
            &[ach("Apr'25", Segment::IR, 5)],
            &[],
            &[],
        );

        assert_eq!(out.kpis.yoy_ach_growth, "0.0");
        assert_eq!(out.kpis.ir_yoy_growth, "0.0");
        // 0/0 on the untouched segment is also guarded.
        assert_eq!(out.kpis.pvt_yoy_growth, "0.0");
    }

    #[test]
    fn kpis_split_segments_and_report_the_gap() {
        let out = analytics(
            &fy(),
            &prev_fy(),
            &[
                plan("Apr'25", Segment::IR, 100),
                plan("Apr'25", Segment::Pvt, 100),
            ],
            &[
                ach("Apr'25", Segment::IR, 60),
                ach("Apr'25", Segment::Pvt, 20),
            ],
            &[plan("Apr'24", Segment::IR, 100)],
            &[ach("Apr'24", Segment::IR, 40)],
        );

        assert_eq!(out.kpis.total_plan, 200);
        assert_eq!(out.kpis.total_achieved, 80);
        assert_eq!(out.kpis.achievement_percent, "40.0");
        assert_eq!(out.kpis.ir_percent, "75.0");
        assert_eq!(out.kpis.pvt_percent, "25.0");
        assert_eq!(out.kpis.yoy_ach_growth, "100.0");
        assert_eq!(out.kpis.gap_absolute, 120);
        assert_eq!(out.kpis.gap_percent, "60.0");
        assert_eq!(out.compare.plan_prev, 100);
        assert_eq!(out.compare.ach_prev, 40);
    }

    #[test]
    fn analytics_serializes_with_wire_field_names() {
        let out = analytics(&fy(), &prev_fy(), &[], &[], &[], &[]);
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("KPIs").is_some());
        assert!(json["KPIs"].get("totalPlan").is_some());
        assert!(json["KPIs"].get("irYoYGrowth").is_some());
        assert!(json["compare"].get("fyPrev").is_some());
    }
}
