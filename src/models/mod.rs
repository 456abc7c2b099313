//! Data models
//!
//! Reference rows, nutrient totals and the meal items passed between the
//! caller, the language model and the aggregator.

mod food_record;
mod meal;
mod nutrition;

pub use food_record::NutritionRecord;
pub use meal::{CandidateSet, MealItem, ParsedFoodItem};
pub use nutrition::{
    Nutrient, NutrientTotals, NutrientValues, TrackedNutrient, RECOMMENDED_PER_MEAL,
};

/// Reference table values are given per this many grams
pub const REFERENCE_BASIS_GRAMS: f64 = 100.0;

/// Portion assumed when no usable gram weight is available
pub const DEFAULT_PORTION_GRAMS: f64 = 100.0;
