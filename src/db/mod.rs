//! Reference data module
//!
//! Loads the nutrition reference file and holds it in memory.

pub mod connection;
pub mod loader;
pub mod table;

pub use loader::{load_table, LoadError, LoadOptions};
pub use table::NutritionTable;
