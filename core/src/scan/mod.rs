//! Scan scheduling
//!
//! # Pass lifecycle
//!
//! ```text
//!   host tick ──► run_pass
//!                   │ running? ──────────────► Busy
//!                   │ radius <= 0 ───────────► Disabled (until reset_all)
//!                   │ inside interval ───────► Debounced
//!                   │ paused / no player ────► Inactive
//!                   ▼
//!            enumerate ► match ► track new ► untrack stale ► Completed
//! ```

mod clock;
mod scheduler;


pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{ScanOutcome, ScanReport, ScanScheduler};
