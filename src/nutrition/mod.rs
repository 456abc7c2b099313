//! Nutrition calculation module
//!
//! Food lookup against the reference table and nutrient aggregation.

pub mod aggregator;
pub mod matcher;

pub use aggregator::aggregate;
pub use matcher::{find_exact, match_food, MatchResult};
