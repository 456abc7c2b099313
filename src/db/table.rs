//! In-memory nutrition reference table
//!
//! Built once at startup and shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::models::NutritionRecord;

/// Ordered, immutable collection of reference rows
#[derive(Debug, Clone, Default)]
pub struct NutritionTable {
    records: Vec<NutritionRecord>,
    /// Lowercased names, parallel to `records`
    folded_names: Vec<String>,
    /// Name -> index of its first occurrence
    first_by_name: HashMap<String, usize>,
    source: Option<PathBuf>,
}

impl NutritionTable {
    pub fn new(records: Vec<NutritionRecord>) -> Self {
        let folded_names = records.iter().map(|r| r.food_name.to_lowercase()).collect();

        let mut first_by_name = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            first_by_name.entry(record.food_name.clone()).or_insert(i);
        }

        Self {
            records,
            folded_names,
            first_by_name,
            source: None,
        }
    }

    /// Remember where the table was loaded from
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[NutritionRecord] {
        &self.records
    }

    /// First record whose name equals `name` exactly
    pub fn first_named(&self, name: &str) -> Option<&NutritionRecord> {
        self.first_by_name.get(name).map(|&i| &self.records[i])
    }

    /// Records paired with their lowercased names, in table order
    pub fn folded(&self) -> impl Iterator<Item = (&NutritionRecord, &str)> {
        self.records
            .iter()
            .zip(self.folded_names.iter().map(String::as_str))
    }
}
