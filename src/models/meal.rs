//! Meal items exchanged with the caller and the language model

use serde::{Deserialize, Deserializer, Serialize};

use super::DEFAULT_PORTION_GRAMS;

/// A food item parsed out of a meal description
///
/// Built by the quantity interpreter from model output; `quantity_g` is already
/// validated (positive) by the time a value of this type exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFoodItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub quantity_g: f64,
    /// Code of the reference row this name matched exactly, once resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_food_code: Option<String>,
}

/// A food the caller picked from a candidate list, with its portion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    /// Anything that is not a JSON number is treated as absent
    #[serde(default, deserialize_with = "lenient_grams")]
    pub quantity_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_food_code: Option<String>,
}

impl MealItem {
    pub fn new(name: impl Into<String>, quantity_g: f64) -> Self {
        Self {
            name: name.into(),
            quantity_g: Some(quantity_g),
            selected_food_code: None,
        }
    }

    /// Portion weight to use, falling back to the default portion
    pub fn grams(&self) -> f64 {
        match self.quantity_g {
            Some(g) if g.is_finite() && g > 0.0 => g,
            _ => DEFAULT_PORTION_GRAMS,
        }
    }
}

impl From<&ParsedFoodItem> for MealItem {
    fn from(item: &ParsedFoodItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity_g: Some(item.quantity_g),
            selected_food_code: item.selected_food_code.clone(),
        }
    }
}

fn lenient_grams<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// Foods offered to the caller for one ambiguous or unknown name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub food_name: String,
    pub candidates: Vec<String>,
}

impl CandidateSet {
    /// A name with no table hit is offered back as its own single candidate
    pub fn literal(food_name: impl Into<String>) -> Self {
        let food_name = food_name.into();
        Self {
            candidates: vec![food_name.clone()],
            food_name,
        }
    }
}
