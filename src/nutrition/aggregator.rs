//! Nutrient aggregation over a meal
//!
//! Each item is resolved by exact name only and scaled from the 100 g basis.
//! Items that do not resolve contribute nothing; the batch never fails.

use tracing::{debug, warn};

use super::matcher::find_exact;
use crate::db::NutritionTable;
use crate::models::{MealItem, NutrientTotals};

/// Sum tracked nutrients for all items that resolve exactly
pub fn aggregate(table: &NutritionTable, items: &[MealItem]) -> NutrientTotals {
    items
        .iter()
        .filter_map(|item| {
            if item.quantity_g.map_or(true, |g| !(g.is_finite() && g > 0.0)) {
                warn!(food = %item.name, "No usable quantity_g; assuming default portion");
            }
            let grams = item.grams();

            match find_exact(table, &item.name) {
                Some(record) => {
                    debug!(
                        food = %record.food_name,
                        code = record.food_code.as_deref().unwrap_or("-"),
                        grams,
                        "Adding food to totals"
                    );
                    Some(record.totals_for(grams))
                }
                None => {
                    warn!(food = %item.name, "No exact nutrition match; excluded from totals");
                    None
                }
            }
        })
        .sum()
}
