//! Nutrition reference record
//!
//! One row of the reference table: a food name, its code, and the full
//! nutrient profile per 100 g.

use super::{NutrientTotals, NutrientValues};

/// A row of the nutrition reference table
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionRecord {
    /// Trimmed food name; not guaranteed unique across the table
    pub food_name: String,
    pub food_code: Option<String>,
    pub nutrients: NutrientValues,
}

impl NutritionRecord {
    pub fn new(
        food_name: impl Into<String>,
        food_code: Option<String>,
        nutrients: NutrientValues,
    ) -> Self {
        Self {
            food_name: food_name.into().trim().to_string(),
            food_code,
            nutrients,
        }
    }

    /// Tracked nutrients for `grams` of this food
    pub fn totals_for(&self, grams: f64) -> NutrientTotals {
        NutrientTotals::from_values(&self.nutrients).scale(grams / super::REFERENCE_BASIS_GRAMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrient;

    #[test]
    fn test_new_trims_name() {
        let record = NutritionRecord::new("  쌀밥 ", None, NutrientValues::default());
        assert_eq!(record.food_name, "쌀밥");
    }

    #[test]
    fn test_totals_for_scales_from_100g() {
        let values = NutrientValues::default()
            .with(Nutrient::Energy, 100.0)
            .with(Nutrient::Protein, 4.0);
        let record = NutritionRecord::new("두부", Some("D101".to_string()), values);

        let totals = record.totals_for(250.0);
        assert!((totals.energy - 250.0).abs() < 1e-9);
        assert!((totals.protein - 10.0).abs() < 1e-9);
    }
}
