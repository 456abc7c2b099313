//! Dietary advice generation

use std::fmt::Write as _;

use tracing::{error, warn};

use super::TextGenerator;
use crate::models::NutrientTotals;

/// First line of every advice prompt
pub const PROMPT_INTRO: &str = "You are a dietitian chatbot.";

/// Language advice is written in unless configured otherwise
pub const DEFAULT_ADVICE_LANGUAGE: &str = "Korean";

/// Returned in place of advice whenever the model cannot provide it
pub const ADVICE_FALLBACK: &str =
    "Sorry, something went wrong while generating dietary advice. Please try again later.";

/// Ask the model for advice on a meal; never fails
pub fn generate_advice(
    generator: &dyn TextGenerator,
    consumed: &NutrientTotals,
    recommended: &NutrientTotals,
    language: &str,
) -> String {
    let prompt = advice_prompt(consumed, recommended, language);
    match generator.generate(&prompt) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(backend = generator.backend_name(), "Model returned blank advice");
            ADVICE_FALLBACK.to_string()
        }
        Err(e) => {
            error!(backend = generator.backend_name(), error = %e, "Advice generation failed");
            ADVICE_FALLBACK.to_string()
        }
    }
}

/// Build the advice prompt from consumed and recommended values
pub fn advice_prompt(
    consumed: &NutrientTotals,
    recommended: &NutrientTotals,
    language: &str,
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "{PROMPT_INTRO} Compare the nutrients the user ate with the recommended \
         intake for one meal and give specific dietary advice."
    );

    prompt.push_str("\nNutrients in the user's meal:\n");
    for tracked in NutrientTotals::TRACKED {
        let value = consumed.get(tracked.nutrient).unwrap_or(0.0);
        let _ = writeln!(prompt, "**{}**: {:.1} {}", tracked.label, value, tracked.unit);
    }

    prompt.push_str("\nRecommended intake per meal:\n");
    for tracked in NutrientTotals::TRACKED {
        let value = recommended.get(tracked.nutrient).unwrap_or(0.0);
        let limit = if tracked.upper_limit { " or less" } else { "" };
        let _ = writeln!(
            prompt,
            "Recommended {}: {} {}{}",
            tracked.label.to_lowercase(),
            value,
            tracked.unit,
            limit
        );
    }

    prompt.push_str(
        "\nBased on the information above, answer the following:\n\
         1. List the nutrients that are lacking and those that are in excess, specifically.\n\
         2. Suggest at least two foods that would make up for the lacking nutrients.\n\
         3. Give eating habits or food choices that would reduce the excess nutrients.\n\
         4. Give a short overall assessment of the meal and a direction for improvement.\n",
    );
    let _ = writeln!(prompt, "\nWrite the whole answer in {language}.");
    prompt
}
