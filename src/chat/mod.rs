//! Chat request types and orchestration

mod orchestrator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::ParseFailure;
use crate::models::{CandidateSet, MealItem, NutrientTotals, ParsedFoodItem};

pub use orchestrator::ChatService;

/// Body of `POST /chat`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Foods picked from an earlier candidate list
    #[serde(default)]
    pub selected_foods: Option<Vec<MealItem>>,
}

/// Totals and advice for a fully resolved meal
#[derive(Debug, Clone, Serialize)]
pub struct NutritionReport {
    pub calculated_nutrition: NutrientTotals,
    pub dietary_advice: String,
}

/// Candidate lists the caller must choose from before anything is computed
#[derive(Debug, Clone, Serialize)]
pub struct SelectionRequest {
    pub select_candidates: Vec<CandidateSet>,
    pub parsed_food_list: Vec<ParsedFoodItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    Computed(NutritionReport),
    NeedsSelection(SelectionRequest),
}

/// Chat request error types
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Please enter a message.")]
    EmptyMessage,

    #[error("Sorry, I couldn't understand the foods you entered. Please try rephrasing.")]
    Unparseable(#[source] ParseFailure),

    #[error("No foods could be found to calculate.")]
    NoComputableFoods,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ChatError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shapes() {
        let message: ChatRequest = serde_json::from_str(r#"{"message": "사과 1개"}"#).unwrap();
        assert_eq!(message.message.as_deref(), Some("사과 1개"));
        assert!(message.selected_foods.is_none());

        let selected: ChatRequest =
            serde_json::from_str(r#"{"selected_foods": [{"name": "사과", "quantity_g": 150}]}"#)
                .unwrap();
        let foods = selected.selected_foods.unwrap();
        assert_eq!(foods[0].name, "사과");
        assert_eq!(foods[0].quantity_g, Some(150.0));

        let empty: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.message.is_none() && empty.selected_foods.is_none());
    }

    #[test]
    fn test_reply_serializes_untagged() {
        let reply = ChatReply::NeedsSelection(SelectionRequest {
            select_candidates: vec![CandidateSet::literal("마라탕")],
            parsed_food_list: vec![],
        });
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["select_candidates"][0]["food_name"], "마라탕");
        assert_eq!(json["select_candidates"][0]["candidates"][0], "마라탕");
        assert!(json["parsed_food_list"].as_array().unwrap().is_empty());

        let reply = ChatReply::Computed(NutritionReport {
            calculated_nutrition: NutrientTotals::zero(),
            dietary_advice: "advice".to_string(),
        });
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["dietary_advice"], "advice");
        assert_eq!(json["calculated_nutrition"]["energy"], 0.0);
    }
}
