//! Objective tracking state
//!
//! This module provides:
//! - **Objectives**: Runtime targets built from the TOML config
//! - **State**: Per-objective tracked entities, slots, and disallow-list
//! - **Registry**: One locked state per objective, rebuilt on reset
//! - **Config loading**: TOML file discovery, parsing, and validation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Objective (TOML config)                      │
//! │   "Track non-empty containers, up to 20 at a time"              │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                         scan pass diff
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 TrackingState (runtime state)                    │
//! │   "Chest 0x1A2B in slot 3, Chest 0x1A2F in slot 1"              │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                     TRACK / UNTRACK events
//! ```

mod config;
mod objective;
mod registry;
mod state;

pub use config::{
    default_config_path, from_toml_str, load_file, load_or_default, ConfigError, CONFIG_FILE_NAME,
};
pub use objective::{Objective, ObjectiveSummary};
pub use registry::{ObjectiveTracker, TrackingRegistry};
pub use state::{RejectReason, Slot, TrackOutcome, TrackingState, UntrackOutcome};
