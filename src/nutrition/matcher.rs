//! Food name matching against the reference table
//!
//! Three outcomes: an exact hit on the trimmed name, a list of names that
//! contain the query (case-insensitive, unanchored, literal), or nothing.

use crate::db::NutritionTable;
use crate::models::NutritionRecord;

/// Outcome of looking up one free-text food name
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult<'a> {
    /// Trimmed query equals a record name; first in table order on duplicates
    Exact(&'a NutritionRecord),
    /// Distinct record names containing the query, in table order
    Candidates(Vec<String>),
    NoMatch,
}

/// Look up a food name
pub fn match_food<'a>(table: &'a NutritionTable, food_name: &str) -> MatchResult<'a> {
    let query = food_name.trim();
    if query.is_empty() {
        return MatchResult::NoMatch;
    }

    if let Some(record) = table.first_named(query) {
        return MatchResult::Exact(record);
    }

    let folded_query = query.to_lowercase();
    let mut candidates: Vec<String> = Vec::new();
    for (record, folded) in table.folded() {
        if folded.contains(&folded_query) && !candidates.contains(&record.food_name) {
            candidates.push(record.food_name.clone());
        }
    }

    if candidates.is_empty() {
        MatchResult::NoMatch
    } else {
        MatchResult::Candidates(candidates)
    }
}

/// Exact-path lookup only
pub fn find_exact<'a>(table: &'a NutritionTable, food_name: &str) -> Option<&'a NutritionRecord> {
    match match_food(table, food_name) {
        MatchResult::Exact(record) => Some(record),
        _ => None,
    }
}
