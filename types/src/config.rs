//! Tracking configuration types
//!
//! These mirror the on-disk TOML layout. The engine turns them into runtime
//! objectives; hosts may also read them directly (e.g. to label journal UI).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Slot capacity used when neither the objective nor its journal entry sets one.
pub const DEFAULT_CAPACITY: u32 = 50;

/// Upper bound on slots per objective.
pub const MAX_CAPACITY: u32 = 256;

/// Radius used when `[general]` omits `search_radius`.
pub const DEFAULT_SEARCH_RADIUS: f32 = 3000.0;

/// Minimum time between two completed scan passes.
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 2000;

fn default_search_radius() -> f32 {
    DEFAULT_SEARCH_RADIUS
}

fn default_scan_interval_ms() -> u64 {
    DEFAULT_SCAN_INTERVAL_MS
}

fn default_start_tracking() -> String {
    "MP_SmartMarkers_TrackActor".to_string()
}

fn default_stop_tracking() -> String {
    "MP_SmartMarkers_StopTrackingActor".to_string()
}

// ═══════════════════════════════════════════════════════════════════════════
// Root
// ═══════════════════════════════════════════════════════════════════════════

/// Complete tracking configuration (one TOML file)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default)]
    pub general: GeneralSettings,

    /// Journal entries keyed by ID. Ordered by key so objective order is stable.
    #[serde(default, rename = "journal")]
    pub journal_entries: BTreeMap<String, JournalEntryConfig>,

    #[serde(default)]
    pub mod_events: ModEventNames,
}

impl TrackingConfig {
    /// Iterate every objective with its journal entry ID and 1-based position.
    pub fn objectives(&self) -> impl Iterator<Item = (&str, usize, &JournalEntryConfig, &ObjectiveConfig)> {
        self.journal_entries.iter().flat_map(|(id, entry)| {
            entry
                .objectives
                .iter()
                .enumerate()
                .map(move |(i, objective)| (id.as_str(), i + 1, entry, objective))
        })
    }

    /// Check invariants that serde can't express.
    ///
    /// Returns a human-readable description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !self.general.search_radius.is_finite() {
            return Err("general.search_radius must be a finite number".to_string());
        }
        if self.general.scan_interval_ms == 0 {
            return Err("general.scan_interval_ms must be greater than 0".to_string());
        }
        if self.mod_events.start_tracking.is_empty() || self.mod_events.stop_tracking.is_empty() {
            return Err("mod_events names must not be empty".to_string());
        }

        for (id, entry) in &self.journal_entries {
            if entry.objectives.is_empty() {
                return Err(format!("journal entry '{id}' has no objectives"));
            }
            for (i, objective) in entry.objectives.iter().enumerate() {
                if objective.name.trim().is_empty() {
                    return Err(format!("journal entry '{id}' objective {} has no name", i + 1));
                }
                let capacity = entry.capacity_for(objective);
                if capacity == 0 || capacity > MAX_CAPACITY {
                    return Err(format!(
                        "journal entry '{id}' objective '{}' capacity {capacity} is outside 1..={MAX_CAPACITY}",
                        objective.name
                    ));
                }
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════════════════════

/// `[general]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Scan radius around the reference entity. Zero or negative disables scanning.
    #[serde(default = "default_search_radius")]
    pub search_radius: f32,

    /// Debounce window between scan passes, in milliseconds
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            search_radius: DEFAULT_SEARCH_RADIUS,
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
        }
    }
}

/// Names of the outbound events sent to the host's event bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModEventNames {
    #[serde(default = "default_start_tracking")]
    pub start_tracking: String,

    #[serde(default = "default_stop_tracking")]
    pub stop_tracking: String,
}

impl Default for ModEventNames {
    fn default() -> Self {
        Self {
            start_tracking: default_start_tracking(),
            stop_tracking: default_stop_tracking(),
        }
    }
}

/// `[journal.<id>]` entry: a named group of objectives shown together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryConfig {
    /// Display name for the journal entry
    #[serde(default)]
    pub name: String,

    /// Editor ID of the host quest backing this entry
    #[serde(default)]
    pub quest: Option<String>,

    /// Slots available to each objective in this entry
    #[serde(default)]
    pub reference_aliases_per_objective: Option<u32>,

    #[serde(default, rename = "objective")]
    pub objectives: Vec<ObjectiveConfig>,
}

impl JournalEntryConfig {
    /// Effective capacity: objective override, then entry setting, then default.
    pub fn capacity_for(&self, objective: &ObjectiveConfig) -> u32 {
        objective
            .capacity
            .or(self.reference_aliases_per_objective)
            .unwrap_or(DEFAULT_CAPACITY)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Objectives
// ═══════════════════════════════════════════════════════════════════════════

/// Entity requirements. Empty lists match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaConfig {
    /// Allowed entity classifications (e.g. "container", "npc")
    #[serde(default)]
    pub form_types: Vec<String>,

    /// Allowed base template classifications
    #[serde(default)]
    pub base_form_types: Vec<String>,

    /// Require at least one named item with positive count
    #[serde(default)]
    pub non_empty_inventory: bool,

    /// Require the entity to be dead
    #[serde(default)]
    pub is_dead: bool,
}

/// `[[journal.<id>.objective]]` entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveConfig {
    /// Display name (journal objective text)
    pub name: String,

    /// Per-objective slot capacity override
    #[serde(default)]
    pub capacity: Option<u32>,

    #[serde(flatten)]
    pub criteria: CriteriaConfig,

    /// Additional criteria; an entity must satisfy all of them
    #[serde(default)]
    pub require: Vec<CriteriaConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[general]
search_radius = 2500.0
scan_interval_ms = 1000

[mod_events]
start_tracking = "Track"
stop_tracking = "Untrack"

[journal.loot]
name = "Loot"
quest = "MP_SmartMarkers_Quest"
reference_aliases_per_objective = 20

[[journal.loot.objective]]
name = "Containers"
form_types = ["container"]
non_empty_inventory = true

[[journal.loot.objective]]
name = "Bodies"
form_types = ["npc"]
is_dead = true
capacity = 5

[[journal.loot.objective.require]]
non_empty_inventory = true
"#;

        let config: TrackingConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.general.search_radius, 2500.0);
        assert_eq!(config.general.scan_interval_ms, 1000);
        assert_eq!(config.mod_events.start_tracking, "Track");

        let entry = &config.journal_entries["loot"];
        assert_eq!(entry.quest.as_deref(), Some("MP_SmartMarkers_Quest"));
        assert_eq!(entry.objectives.len(), 2);
        assert_eq!(entry.objectives[0].criteria.form_types, vec!["container"]);
        assert!(entry.objectives[0].criteria.non_empty_inventory);
        assert_eq!(entry.capacity_for(&entry.objectives[0]), 20);
        assert_eq!(entry.capacity_for(&entry.objectives[1]), 5);
        assert_eq!(entry.objectives[1].require.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let toml = r#"
[[journal.bodies.objective]]
name = "Bodies"
is_dead = true
"#;
        let config: TrackingConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.general.search_radius, DEFAULT_SEARCH_RADIUS);
        assert_eq!(config.general.scan_interval_ms, DEFAULT_SCAN_INTERVAL_MS);
        assert_eq!(config.mod_events, ModEventNames::default());

        let entry = &config.journal_entries["bodies"];
        assert_eq!(entry.capacity_for(&entry.objectives[0]), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_default_event_names_match_consumer_scripts() {
        let names = ModEventNames::default();
        assert_eq!(names.start_tracking, "MP_SmartMarkers_TrackActor");
        assert_eq!(names.stop_tracking, "MP_SmartMarkers_StopTrackingActor");

        let config: TrackingConfig = toml::from_str("[mod_events]\nstart_tracking = \"Begin\"\n").unwrap();
        assert_eq!(config.mod_events.start_tracking, "Begin");
        assert_eq!(config.mod_events.stop_tracking, "MP_SmartMarkers_StopTrackingActor");
    }

    #[test]
    fn test_objectives_are_ordered_by_entry_then_position() {
        let toml = r#"
[[journal.b.objective]]
name = "B1"

[[journal.a.objective]]
name = "A1"

[[journal.a.objective]]
name = "A2"
"#;
        let config: TrackingConfig = toml::from_str(toml).unwrap();
        let order: Vec<(&str, usize)> = config.objectives().map(|(id, n, _, _)| (id, n)).collect();
        assert_eq!(order, vec![("a", 1), ("a", 2), ("b", 1)]);
    }

    #[test]
    fn test_validate_rejects_bad_capacity() {
        let toml = r#"
[journal.x]
reference_aliases_per_objective = 0

[[journal.x.objective]]
name = "Anything"
"#;
        let config: TrackingConfig = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("capacity 0"), "{err}");
    }

    #[test]
    fn test_validate_rejects_entry_without_objectives() {
        let toml = r#"
[journal.empty]
name = "Nothing here"
"#;
        let config: TrackingConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().unwrap_err().contains("no objectives"));
    }
}
