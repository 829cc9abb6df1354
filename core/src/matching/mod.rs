//! Objective matching
//!
//! - **Criteria**: per-objective requirements built from config
//! - **Matcher**: evaluates a world entity against an objective

mod criteria;
mod matcher;

pub use criteria::{FormKind, MatchCriteria};
pub use matcher::ObjectiveMatcher;
