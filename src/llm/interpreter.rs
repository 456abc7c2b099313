//! Meal description interpreter
//!
//! Asks the model to turn a free-text meal description into a JSON list of
//! `{name, quantity, unit, quantity_g}` objects and decodes the answer
//! strictly. The model output is untrusted: anything that is not a JSON array
//! of objects with a string `name` and numeric quantities is rejected.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{LlmError, TextGenerator};
use crate::models::{ParsedFoodItem, DEFAULT_PORTION_GRAMS};

/// First line of every meal parsing prompt
pub const PROMPT_INTRO: &str =
    "You extract the foods a user ate from a sentence and return them as JSON.";

/// Quantity and unit assumed when the description gives none
pub const DEFAULT_QUANTITY: f64 = 100.0;
pub const DEFAULT_UNIT: &str = "g";

/// Why a meal description could not be turned into a food list
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("model response is not valid JSON: {0}")]
    Syntax(serde_json::Error),

    #[error("model response does not match the food list shape: {0}")]
    Shape(serde_json::Error),

    #[error("model response contained no foods")]
    Empty,
}

impl From<serde_json::Error> for ParseFailure {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            ParseFailure::Shape(err)
        } else {
            ParseFailure::Syntax(err)
        }
    }
}

/// Food item exactly as the model returned it
#[derive(Debug, Deserialize)]
struct ModelFoodItem {
    name: String,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    quantity_g: Option<f64>,
}

/// Parse a meal description into food items
pub fn parse_meal(
    generator: &dyn TextGenerator,
    raw_text: &str,
) -> Result<Vec<ParsedFoodItem>, ParseFailure> {
    let prompt = meal_prompt(raw_text);
    let response = generator.generate(&prompt)?;
    debug!(backend = generator.backend_name(), response = %response, "Meal parse response");

    decode_food_list(&response).map_err(|e| {
        warn!(error = %e, response = %response, "Rejected meal parse response");
        e
    })
}

/// Strictly decode a model answer into validated food items
pub fn decode_food_list(response: &str) -> Result<Vec<ParsedFoodItem>, ParseFailure> {
    let raw: Vec<ModelFoodItem> = serde_json::from_str(strip_code_fence(response))?;

    let items: Vec<ParsedFoodItem> = raw.into_iter().filter_map(normalize_item).collect();
    if items.is_empty() {
        return Err(ParseFailure::Empty);
    }
    Ok(items)
}

fn normalize_item(item: ModelFoodItem) -> Option<ParsedFoodItem> {
    let name = item.name.trim();
    if name.is_empty() {
        warn!("Dropping parsed food item without a name");
        return None;
    }

    let quantity = item
        .quantity
        .filter(|q| q.is_finite())
        .unwrap_or(DEFAULT_QUANTITY);

    let unit = item
        .unit
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_UNIT.to_string());

    let quantity_g = match item.quantity_g {
        Some(g) if g.is_finite() && g > 0.0 => g,
        other => {
            warn!(
                food = name,
                quantity_g = ?other,
                "Invalid gram estimate; using default portion"
            );
            DEFAULT_PORTION_GRAMS
        }
    };

    Some(ParsedFoodItem {
        name: name.to_string(),
        quantity,
        unit,
        quantity_g,
        selected_food_code: None,
    })
}

/// Remove surrounding whitespace and a Markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.trim()
}

/// Build the meal parsing prompt
pub fn meal_prompt(raw_text: &str) -> String {
    format!(
        r#"{PROMPT_INTRO}
Extract every food name, quantity and unit from the user's sentence, estimate how many grams each food
usually weighs, and put that estimate in a numeric "quantity_g" field.

Rules:
1. Each food is one JSON object: {{"name": "food name", "quantity": number, "unit": "unit", "quantity_g": number}}
2. "quantity_g" is a reasonable estimate in grams based on "quantity" and "unit".
3. If the quantity is already in grams (g), "quantity_g" equals "quantity".
4. For other units (piece, cup, bowl, bag, slice, ...) estimate the weight from a typical serving, e.g.
   - 사과 1개 (one apple) -> quantity_g: 200
   - 쌀밥 1공기 (one bowl of rice) -> quantity_g: 210
   - 계란 후라이 1개 (one fried egg) -> quantity_g: 60
   - 바나나 1개 (one banana) -> quantity_g: 120
   - 배 1개 (one pear) -> quantity_g: 500
   - 식빵 1조각 (one slice of bread) -> quantity_g: 30
5. If no quantity is given, use "quantity": 100, "unit": "g" and "quantity_g": 100.
6. Keep food names as the user wrote them.
7. Return only the JSON array, with no explanation.

Examples:
Input: "사과 100g, 바나나 1개"
Output:
[{{"name": "사과", "quantity": 100, "unit": "g", "quantity_g": 100}},
 {{"name": "바나나", "quantity": 1, "unit": "개", "quantity_g": 120}}]

Input: "점심으로 쌀밥 200g이랑 김치찌개 한그릇 먹었어."
Output:
[{{"name": "쌀밥", "quantity": 200, "unit": "g", "quantity_g": 200}},
 {{"name": "김치찌개", "quantity": 1, "unit": "그릇", "quantity_g": 400}}]

Input: "계란 후라이"
Output:
[{{"name": "계란 후라이", "quantity": 100, "unit": "g", "quantity_g": 100}}]

Sentence: "{raw_text}"
"#
    )
}
