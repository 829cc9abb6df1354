//! Runtime objectives built from configuration

use markers_types::{TrackingConfig, MAX_CAPACITY};
use serde::Serialize;

use crate::matching::MatchCriteria;

use super::Slot;

/// A named, capacity-bounded tracking target.
///
/// Immutable once built; shared read-only between the registry and matchers.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    id: String,
    name: String,
    criteria: Vec<MatchCriteria>,
    capacity: u32,
}

impl Objective {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        criteria: Vec<MatchCriteria>,
        capacity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            criteria,
            capacity: capacity.min(MAX_CAPACITY),
        }
    }

    /// Build every configured objective, in config order.
    ///
    /// IDs are `<journal id>.Objective<n>` with `n` counted from 1.
    pub fn all_from_config(config: &TrackingConfig) -> Vec<Objective> {
        config
            .objectives()
            .map(|(entry_id, position, entry, objective)| {
                let criteria = std::iter::once(&objective.criteria)
                    .chain(objective.require.iter())
                    .map(MatchCriteria::from)
                    .collect();
                Objective::new(
                    format!("{entry_id}.Objective{position}"),
                    objective.name.clone(),
                    criteria,
                    entry.capacity_for(objective),
                )
            })
            .collect()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn criteria(&self) -> &[MatchCriteria] {
        &self.criteria
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Label that identifies one slot of this objective to the consumer.
    ///
    /// Stable for the slot's whole occupancy so TRACK/UNTRACK pairs correlate.
    pub fn slot_label(&self, slot: Slot) -> String {
        format!("{}_{}", self.id, slot)
    }

    pub fn summary(&self) -> ObjectiveSummary {
        ObjectiveSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            capacity: self.capacity,
        }
    }
}

/// Catalog entry for hosts labelling their journal UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectiveSummary {
    pub id: String,
    pub name: String,
    pub capacity: u32,
}

#[cfg(test)]
mod tests {
    use markers_types::{CriteriaConfig, JournalEntryConfig, ObjectiveConfig, DEFAULT_CAPACITY};

    use super::*;
    use crate::matching::FormKind;

    fn config() -> TrackingConfig {
        let mut config = TrackingConfig::default();
        config.journal_entries.insert(
            "loot".to_string(),
            JournalEntryConfig {
                name: "Loot".to_string(),
                reference_aliases_per_objective: Some(12),
                objectives: vec![
                    ObjectiveConfig {
                        name: "Chests".to_string(),
                        criteria: CriteriaConfig {
                            form_types: vec!["Container".to_string()],
                            non_empty_inventory: true,
                            ..CriteriaConfig::default()
                        },
                        ..ObjectiveConfig::default()
                    },
                    ObjectiveConfig {
                        name: "Bodies".to_string(),
                        capacity: Some(3),
                        criteria: CriteriaConfig {
                            is_dead: true,
                            ..CriteriaConfig::default()
                        },
                        require: vec![CriteriaConfig {
                            non_empty_inventory: true,
                            ..CriteriaConfig::default()
                        }],
                    },
                ],
                ..JournalEntryConfig::default()
            },
        );
        config.journal_entries.insert(
            "misc".to_string(),
            JournalEntryConfig {
                objectives: vec![ObjectiveConfig {
                    name: "Anything".to_string(),
                    ..ObjectiveConfig::default()
                }],
                ..JournalEntryConfig::default()
            },
        );
        config
    }

    #[test]
    fn test_all_from_config() {
        let objectives = Objective::all_from_config(&config());
        let ids: Vec<&str> = objectives.iter().map(Objective::id).collect();
        assert_eq!(ids, vec!["loot.Objective1", "loot.Objective2", "misc.Objective1"]);

        assert_eq!(objectives[0].capacity(), 12);
        assert_eq!(objectives[0].criteria().len(), 1);
        assert!(objectives[0].criteria()[0].form_kinds.contains(&FormKind::new("container")));

        assert_eq!(objectives[1].capacity(), 3);
        assert_eq!(objectives[1].criteria().len(), 2);
        assert!(objectives[1].criteria()[1].non_empty_inventory);

        assert_eq!(objectives[2].capacity(), DEFAULT_CAPACITY);
        assert!(objectives[2].criteria()[0].is_wildcard());
    }

    #[test]
    fn test_slot_label_and_capacity_cap() {
        let objective = Objective::new("loot.Objective1", "Chests", vec![], 10_000);
        assert_eq!(objective.capacity(), MAX_CAPACITY);
        assert_eq!(objective.slot_label(Slot::FIRST), "loot.Objective1_1");
    }
}
