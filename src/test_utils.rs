//! Test fixtures and fakes
//!
//! A small reference table and closure-backed text generators so the
//! orchestrator and HTTP layer can be driven without network access.

use crate::db::NutritionTable;
use crate::llm::{advice, interpreter, LlmError, TextGenerator};
use crate::models::{Nutrient, NutrientValues, NutritionRecord};

/// Text generator backed by a closure
pub struct FnGenerator<F>(F);

impl<F> FnGenerator<F>
where
    F: Fn(&str) -> Result<String, LlmError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> TextGenerator for FnGenerator<F>
where
    F: Fn(&str) -> Result<String, LlmError> + Send + Sync,
{
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (self.0)(prompt)
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}

/// Generator that answers meal prompts with `meal_json` and advice prompts with `advice_reply`
///
/// An `Err` reply simulates a failing model call.
pub fn scripted_generator(
    meal_json: &str,
    advice_reply: Result<&str, &str>,
) -> FnGenerator<impl Fn(&str) -> Result<String, LlmError> + Send + Sync> {
    let meal_json = meal_json.to_string();
    let advice_reply = advice_reply.map(str::to_string).map_err(str::to_string);

    FnGenerator::new(move |prompt: &str| {
        if prompt.starts_with(interpreter::PROMPT_INTRO) {
            Ok(meal_json.clone())
        } else if prompt.starts_with(advice::PROMPT_INTRO) {
            advice_reply.clone().map_err(LlmError::Unavailable)
        } else {
            Err(LlmError::Unavailable("unexpected prompt".to_string()))
        }
    })
}

/// Reference table used across tests
///
/// | name          | code | energy | carb | protein | fat  | sugar | fiber | sat | trans |
/// |---------------|------|--------|------|---------|------|-------|-------|-----|-------|
/// | 쌀밥          | R001 | 143    | 31.7 | 2.5     | 0.3  | 0     | 0.3   | 0.1 | 0     |
/// | 사과          | F001 | 57     | 14.4 | 0.2     | 0.1  | 11.0  | 1.4   | 0   | 0     |
/// | 두부          | T001 | 100    | 2.0  | 9.6     | 5.6  | 0.3   | 0.9   | 0.9 | 0     |
/// | 콩나물무침    | S001 | 52     | 4.2  | 3.6     | 2.5  | 0.8   | 2.3   | 0.3 | 0     |
/// | 콩국수        | N001 | 110    | 15.0 | 5.8     | 3.0  | 1.2   | 1.1   | 0.5 | 0     |
/// | 김치찌개      | K001 | 48     | 2.9  | 3.5     | 2.6  | 1.0   | 0.9   | 0.9 | 0.02  |
pub fn fixture_table() -> NutritionTable {
    let row = |name: &str, code: &str, v: [f64; 8]| {
        NutritionRecord::new(
            name,
            Some(code.to_string()),
            NutrientValues::default()
                .with(Nutrient::Energy, v[0])
                .with(Nutrient::Carbohydrate, v[1])
                .with(Nutrient::Protein, v[2])
                .with(Nutrient::Fat, v[3])
                .with(Nutrient::Sugar, v[4])
                .with(Nutrient::DietaryFiber, v[5])
                .with(Nutrient::SaturatedFattyAcids, v[6])
                .with(Nutrient::TransFattyAcids, v[7]),
        )
    };

    NutritionTable::new(vec![
        row("쌀밥", "R001", [143.0, 31.7, 2.5, 0.3, 0.0, 0.3, 0.1, 0.0]),
        row("사과", "F001", [57.0, 14.4, 0.2, 0.1, 11.0, 1.4, 0.0, 0.0]),
        row("두부", "T001", [100.0, 2.0, 9.6, 5.6, 0.3, 0.9, 0.9, 0.0]),
        row("콩나물무침", "S001", [52.0, 4.2, 3.6, 2.5, 0.8, 2.3, 0.3, 0.0]),
        row("콩국수", "N001", [110.0, 15.0, 5.8, 3.0, 1.2, 1.1, 0.5, 0.0]),
        row("김치찌개", "K001", [48.0, 2.9, 3.5, 2.6, 1.0, 0.9, 0.9, 0.02]),
    ])
}
