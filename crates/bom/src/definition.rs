use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use wagonops_core::{DomainResult, WagonType};

/// A part and the total quantity one finished wagon requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRequirement {
    pub name: String,
    pub total: i64,
}

/// Quantity of one part consumed per wagon completing a given stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartUsage {
    pub name: String,
    pub used: i64,
}

/// A named production stage and the parts it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: String,
    pub part_usage: Vec<PartUsage>,
}

/// Bill of Materials for one wagon type.
///
/// Re-saving a BOM is a full replace of the parts/stages arrays; there is no
/// partial patching during a production run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bom {
    wagon_type: WagonType,
    parts: Vec<PartRequirement>,
    stages: Vec<Stage>,
}

impl Bom {
    /// Build a BOM, normalizing its arrays: part and stage names are
    /// trimmed, entries with empty names are dropped.
    pub fn new(
        wagon_type: WagonType,
        parts: Vec<PartRequirement>,
        stages: Vec<Stage>,
    ) -> DomainResult<Self> {
        let parts = parts
            .into_iter()
            .filter_map(|p| {
                let name = p.name.trim().to_string();
                (!name.is_empty()).then_some(PartRequirement { name, total: p.total })
            })
            .collect();

        let stages = stages
            .into_iter()
            .filter_map(|s| {
                let name = s.name.trim().to_string();
                if name.is_empty() {
                    return None;
                }
                let part_usage = s
                    .part_usage
                    .into_iter()
                    .filter_map(|u| {
                        let name = u.name.trim().to_string();
                        (!name.is_empty()).then_some(PartUsage { name, used: u.used })
                    })
                    .collect();
                Some(Stage { name, part_usage })
            })
            .collect();

        Ok(Self {
            wagon_type,
            parts,
            stages,
        })
    }

    pub fn wagon_type(&self) -> &WagonType {
        &self.wagon_type
    }

    pub fn parts(&self) -> &[PartRequirement] {
        &self.parts
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Compute the parts consumed by a day's stage completions.
    ///
    /// For each stage present in **both** the input and this BOM, every part
    /// in the stage's usage list accumulates `used × completed`. Stages the
    /// BOM does not know are silently ignored: stage sets evolve
    /// independently of BOM definitions, so an unknown stage consumes
    /// nothing rather than failing the whole report. Non-positive usage
    /// rates are skipped.
    pub fn consumption(&self, stages_completed: &BTreeMap<String, u32>) -> BTreeMap<String, i64> {
        let mut consumed: BTreeMap<String, i64> = BTreeMap::new();

        for (stage_name, completed) in stages_completed {
            if *completed == 0 {
                continue;
            }
            let Some(stage) = self.stages.iter().find(|s| s.name == stage_name.trim()) else {
                continue;
            };
            for usage in &stage.part_usage {
                if usage.used <= 0 {
                    continue;
                }
                *consumed.entry(usage.name.clone()).or_insert(0) +=
                    usage.used * i64::from(*completed);
            }
        }

        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxn() -> Bom {
        Bom::new(
            WagonType::new("BOXN").unwrap(),
            vec![PartRequirement {
                name: "Roof".into(),
                total: 4,
            }],
            vec![
                Stage {
                    name: "Boxing".into(),
                    part_usage: vec![PartUsage {
                        name: "Roof".into(),
                        used: 4,
                    }],
                },
                Stage {
                    name: "PDI".into(),
                    part_usage: vec![],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn consumption_multiplies_usage_by_completed_count() {
        let bom = boxn();
        let mut stages = BTreeMap::new();
        stages.insert("Boxing".to_string(), 3);

        let consumed = bom.consumption(&stages);
        assert_eq!(consumed.get("Roof"), Some(&12));
    }

    #[test]
    fn stages_unknown_to_the_bom_are_ignored() {
        let bom = boxn();
        let mut stages = BTreeMap::new();
        stages.insert("Painting".to_string(), 5);

        assert!(bom.consumption(&stages).is_empty());
    }

    #[test]
    fn consumption_accumulates_across_stages() {
        let bom = Bom::new(
            WagonType::new("BCNA").unwrap(),
            vec![],
            vec![
                Stage {
                    name: "Underframe".into(),
                    part_usage: vec![PartUsage {
                        name: "Axle".into(),
                        used: 2,
                    }],
                },
                Stage {
                    name: "Wheeling".into(),
                    part_usage: vec![PartUsage {
                        name: "Axle".into(),
                        used: 1,
                    }],
                },
            ],
        )
        .unwrap();

        let mut stages = BTreeMap::new();
        stages.insert("Underframe".to_string(), 2);
        stages.insert("Wheeling".to_string(), 3);

        assert_eq!(bom.consumption(&stages).get("Axle"), Some(&7));
    }

    #[test]
    fn non_positive_usage_is_skipped() {
        let bom = Bom::new(
            WagonType::new("BOXN").unwrap(),
            vec![],
            vec![Stage {
                name: "Boxing".into(),
                part_usage: vec![
                    PartUsage {
                        name: "Roof".into(),
                        used: 0,
                    },
                    PartUsage {
                        name: "Side Wall".into(),
                        used: -2,
                    },
                ],
            }],
        )
        .unwrap();

        let mut stages = BTreeMap::new();
        stages.insert("Boxing".to_string(), 4);

        assert!(bom.consumption(&stages).is_empty());
    }

    proptest::proptest! {
        /// consumed[part] = Σ over stages known to the BOM of used × completed.
        #[test]
        fn consumption_is_linear_in_completed_counts(
            boxing in 0u32..500,
            wheeling in 0u32..500,
            unknown in 0u32..500,
        ) {
            let bom = Bom::new(
                WagonType::new("BOXN").unwrap(),
                vec![],
                vec![
                    Stage {
                        name: "Boxing".into(),
                        part_usage: vec![PartUsage { name: "Roof".into(), used: 4 }],
                    },
                    Stage {
                        name: "Wheeling".into(),
                        part_usage: vec![PartUsage { name: "Roof".into(), used: 1 }],
                    },
                ],
            )
            .unwrap();

            let mut stages = BTreeMap::new();
            stages.insert("Boxing".to_string(), boxing);
            stages.insert("Wheeling".to_string(), wheeling);
            stages.insert("Painting".to_string(), unknown);

            let consumed = bom.consumption(&stages);
            let expected = 4 * i64::from(boxing) + i64::from(wheeling);
            proptest::prop_assert_eq!(consumed.get("Roof").copied().unwrap_or(0), expected);
        }
    }

    #[test]
    fn normalization_drops_empty_names() {
        let bom = Bom::new(
            WagonType::new("BOXN").unwrap(),
            vec![
                PartRequirement {
                    name: "   ".into(),
                    total: 1,
                },
                PartRequirement {
                    name: " Roof ".into(),
                    total: 4,
                },
            ],
            vec![Stage {
                name: "  ".into(),
                part_usage: vec![],
            }],
        )
        .unwrap();

        assert_eq!(bom.parts().len(), 1);
        assert_eq!(bom.parts()[0].name, "Roof");
        assert!(bom.stages().is_empty());
    }
}
