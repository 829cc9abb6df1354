//! Scripted worlds for replay
//!
//! A scenario declares every entity up front, then a list of ticks. Each tick
//! moves the clock, optionally changes what is nearby or how entities look,
//! and triggers one scan pass.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use markers_core::{FormKind, InventoryItem, World};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or replaying a scenario
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse scenario {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid scenario: {0}")]
    Invalid(String),

    #[error(transparent)]
    Config(#[from] markers_core::ConfigError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// File format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Entity the search is centered on
    #[serde(default)]
    pub player: u32,

    #[serde(default, rename = "entity")]
    pub entities: Vec<EntitySpec>,

    #[serde(default, rename = "tick")]
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntitySpec {
    pub id: u32,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub base_kind: Option<String>,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub count: i32,
}

/// One host tick
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tick {
    pub at_ms: u64,

    /// Entities in range from this tick on; omitted keeps the previous set
    #[serde(default)]
    pub nearby: Option<Vec<u32>>,

    #[serde(default)]
    pub paused: bool,

    /// Reset all tracking state before the pass
    #[serde(default)]
    pub reset: bool,

    /// Entities disallowed before the pass
    #[serde(default)]
    pub disallow: Vec<u32>,

    /// Entities that become deleted
    #[serde(default)]
    pub delete: Vec<u32>,

    /// Entities that die
    #[serde(default)]
    pub kill: Vec<u32>,

    /// Entities whose inventory gets emptied
    #[serde(default)]
    pub empty: Vec<u32>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let contents = fs::read_to_string(path).map_err(|e| ReplayError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let scenario: Scenario = toml::from_str(&contents).map_err(|e| ReplayError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        scenario.validate()?;

        tracing::info!(
            path = %path.display(),
            entities = scenario.entities.len(),
            ticks = scenario.ticks.len(),
            "Loaded scenario"
        );
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ReplayError> {
        if let Some(pair) = self.ticks.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(ReplayError::Invalid(format!(
                "tick at {}ms comes after tick at {}ms",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// World
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Frame {
    entities: HashMap<u32, EntitySpec>,
    nearby: Vec<u32>,
    paused: bool,
}

/// `World` backed by a scenario. Undeclared entities read as deleted.
#[derive(Debug)]
pub struct ScenarioWorld {
    player: u32,
    frame: Mutex<Frame>,
}

impl ScenarioWorld {
    pub fn new(scenario: &Scenario) -> Self {
        let entities = scenario
            .entities
            .iter()
            .map(|e| (e.id, e.clone()))
            .collect();
        Self {
            player: scenario.player,
            frame: Mutex::new(Frame {
                entities,
                ..Frame::default()
            }),
        }
    }

    /// Apply a tick's world changes
    pub fn apply(&self, tick: &Tick) {
        let mut frame = self.frame();
        if let Some(nearby) = &tick.nearby {
            frame.nearby = nearby.clone();
        }
        frame.paused = tick.paused;

        for id in &tick.delete {
            if let Some(e) = frame.entities.get_mut(id) {
                e.deleted = true;
            }
        }
        for id in &tick.kill {
            if let Some(e) = frame.entities.get_mut(id) {
                e.dead = true;
            }
        }
        for id in &tick.empty {
            if let Some(e) = frame.entities.get_mut(id) {
                e.items.clear();
            }
        }
    }

    fn frame(&self) -> MutexGuard<'_, Frame> {
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_entity<R>(&self, id: u32, f: impl FnOnce(&EntitySpec) -> R) -> Option<R> {
        self.frame().entities.get(&id).map(f)
    }
}

impl World for ScenarioWorld {
    type Entity = u32;

    fn is_simulation_advancing(&self) -> bool {
        !self.frame().paused
    }

    fn reference_entity(&self) -> Option<u32> {
        Some(self.player)
    }

    fn nearby(&self, _origin: u32, _radius: f32) -> impl Iterator<Item = u32> {
        self.frame().nearby.clone().into_iter()
    }

    fn is_deleted(&self, entity: u32) -> bool {
        self.with_entity(entity, |e| e.deleted).unwrap_or(true)
    }

    fn classification(&self, entity: u32) -> Option<FormKind> {
        self.with_entity(entity, |e| e.kind.as_deref().map(FormKind::new))
            .flatten()
    }

    fn is_dead(&self, entity: u32) -> bool {
        self.with_entity(entity, |e| e.dead).unwrap_or(false)
    }

    fn inventory(&self, entity: u32) -> Vec<InventoryItem> {
        self.with_entity(entity, |e| {
            e.items
                .iter()
                .map(|item| InventoryItem {
                    name: item.name.clone(),
                    count: item.count,
                })
                .collect()
        })
        .unwrap_or_default()
    }

    fn base_kind(&self, entity: u32) -> Option<FormKind> {
        self.with_entity(entity, |e| e.base_kind.as_deref().map(FormKind::new))
            .flatten()
    }
}
