//! Shared configuration types for SmartMarkers

pub mod config;

pub use config::{
    CriteriaConfig, GeneralSettings, JournalEntryConfig, ModEventNames, ObjectiveConfig,
    TrackingConfig, DEFAULT_CAPACITY, DEFAULT_SCAN_INTERVAL_MS, DEFAULT_SEARCH_RADIUS,
    MAX_CAPACITY,
};
