//! Chat request orchestration
//!
//! Sequences parsing, matching, aggregation and advice for one request.
//!
//! A raw message is parsed into foods and every food is matched against the
//! reference table. If any food is ambiguous or unknown, nothing is computed:
//! the caller gets every candidate set plus the full parsed list and must come
//! back with `selected_foods`. Only when all foods match exactly are totals
//! and advice produced in the same pass.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{ChatError, ChatReply, ChatRequest, NutritionReport, SelectionRequest};
use crate::db::NutritionTable;
use crate::llm::advice::DEFAULT_ADVICE_LANGUAGE;
use crate::llm::{generate_advice, parse_meal, TextGenerator};
use crate::models::{CandidateSet, MealItem, NutrientTotals, RECOMMENDED_PER_MEAL};
use crate::nutrition::{aggregate, find_exact, match_food, MatchResult};

/// Request coordinator shared by all HTTP handlers
#[derive(Clone)]
pub struct ChatService {
    table: Arc<NutritionTable>,
    generator: Arc<dyn TextGenerator>,
    recommended: NutrientTotals,
    advice_language: String,
}

impl ChatService {
    pub fn new(table: Arc<NutritionTable>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            table,
            generator,
            recommended: RECOMMENDED_PER_MEAL,
            advice_language: DEFAULT_ADVICE_LANGUAGE.to_string(),
        }
    }

    /// Language the model is asked to write advice in
    pub fn with_advice_language(mut self, language: impl Into<String>) -> Self {
        self.advice_language = language.into();
        self
    }

    pub fn table(&self) -> &NutritionTable {
        &self.table
    }

    /// Handle one chat request
    ///
    /// `selected_foods` takes precedence over `message` when both are present.
    pub fn handle(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        match request.selected_foods {
            Some(selected) => self.compute_selected(&selected),
            None => self.handle_message(request.message.as_deref().unwrap_or_default()),
        }
    }

    /// Compute totals for foods the caller picked from earlier candidates
    pub fn compute_selected(&self, selected: &[MealItem]) -> Result<ChatReply, ChatError> {
        let resolved: Vec<MealItem> = selected
            .iter()
            .filter_map(|item| match find_exact(&self.table, &item.name) {
                Some(record) => {
                    debug!(
                        food = %record.food_name,
                        code = ?record.food_code,
                        "Selected food resolved"
                    );
                    Some(MealItem {
                        selected_food_code: record.food_code.clone(),
                        ..item.clone()
                    })
                }
                None => {
                    warn!(food = %item.name, "Selected food not in reference table; dropped");
                    None
                }
            })
            .collect();

        if resolved.is_empty() {
            return Err(ChatError::NoComputableFoods);
        }

        Ok(ChatReply::Computed(self.compute(&resolved)))
    }

    /// Parse a free-text meal and either compute it or ask for selections
    pub fn handle_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let mut parsed =
            parse_meal(self.generator.as_ref(), message).map_err(ChatError::Unparseable)?;

        let mut direct: Vec<MealItem> = Vec::with_capacity(parsed.len());
        let mut pending: Vec<CandidateSet> = Vec::new();

        for item in parsed.iter_mut() {
            match match_food(&self.table, &item.name) {
                MatchResult::Exact(record) => {
                    debug!(food = %item.name, code = ?record.food_code, "Exact match");
                    item.selected_food_code = record.food_code.clone();
                    direct.push(MealItem::from(&*item));
                }
                MatchResult::Candidates(candidates) => {
                    debug!(food = %item.name, count = candidates.len(), "Ambiguous food");
                    pending.push(CandidateSet {
                        food_name: item.name.clone(),
                        candidates,
                    });
                }
                MatchResult::NoMatch => {
                    debug!(food = %item.name, "No match; offering the name itself");
                    pending.push(CandidateSet::literal(item.name.clone()));
                }
            }
        }

        if !pending.is_empty() {
            info!(
                parsed = parsed.len(),
                pending = pending.len(),
                "Foods need selection before computing"
            );
            return Ok(ChatReply::NeedsSelection(SelectionRequest {
                select_candidates: pending,
                parsed_food_list: parsed,
            }));
        }

        if direct.is_empty() {
            return Err(ChatError::NoComputableFoods);
        }

        Ok(ChatReply::Computed(self.compute(&direct)))
    }

    fn compute(&self, items: &[MealItem]) -> NutritionReport {
        let calculated_nutrition = aggregate(&self.table, items);
        info!(
            foods = items.len(),
            energy = calculated_nutrition.energy,
            "Computed meal nutrition"
        );

        let dietary_advice = generate_advice(
            self.generator.as_ref(),
            &calculated_nutrition,
            &self.recommended,
            &self.advice_language,
        );

        NutritionReport {
            calculated_nutrition,
            dietary_advice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ADVICE_FALLBACK;
    use crate::models::ParsedFoodItem;
    use crate::test_utils::{fixture_table, scripted_generator, FnGenerator};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service(meal_json: &str, advice: Result<&str, &str>) -> ChatService {
        ChatService::new(
            Arc::new(fixture_table()),
            Arc::new(scripted_generator(meal_json, advice)),
        )
    }

    fn computed(reply: ChatReply) -> NutritionReport {
        match reply {
            ChatReply::Computed(report) => report,
            other => panic!("expected computed reply, got {:?}", other),
        }
    }

    #[test]
    fn test_selected_foods_direct_compute() {
        let service = service("[]", Ok("Looks balanced."));
        let reply = service
            .compute_selected(&[MealItem::new("두부", 150.0)])
            .unwrap();

        let report = computed(reply);
        assert!((report.calculated_nutrition.energy - 150.0).abs() < 1e-9);
        assert!((report.calculated_nutrition.protein - 14.4).abs() < 1e-9);
        assert_eq!(report.dietary_advice, "Looks balanced.");
    }

    #[test]
    fn test_selected_foods_drop_unknown_names() {
        let service = service("[]", Ok("ok"));
        let report = computed(
            service
                .compute_selected(&[MealItem::new("사과", 200.0), MealItem::new("사", 100.0)])
                .unwrap(),
        );
        assert!((report.calculated_nutrition.energy - 114.0).abs() < 1e-9);
    }

    #[test]
    fn test_selected_foods_none_resolvable() {
        let service = service("[]", Ok("ok"));
        assert!(matches!(
            service.compute_selected(&[MealItem::new("마라탕", 300.0)]),
            Err(ChatError::NoComputableFoods)
        ));
        assert!(matches!(
            service.compute_selected(&[]),
            Err(ChatError::NoComputableFoods)
        ));
    }

    #[test]
    fn test_empty_message_rejected_without_model_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let generator = FnGenerator::new(move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("[]".to_string())
        });
        let service = ChatService::new(Arc::new(fixture_table()), Arc::new(generator));

        assert!(matches!(service.handle_message("   "), Err(ChatError::EmptyMessage)));
        assert!(matches!(
            service.handle(ChatRequest::default()),
            Err(ChatError::EmptyMessage)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unparseable_message() {
        let service = service("I am not JSON", Ok("ok"));
        assert!(matches!(
            service.handle_message("사과 먹었어"),
            Err(ChatError::Unparseable(_))
        ));
    }

    #[test]
    fn test_all_exact_matches_compute_immediately() {
        let service = service(
            r#"[{"name": "쌀밥", "quantity": 1, "unit": "공기", "quantity_g": 210},
                {"name": "김치찌개", "quantity": 1, "unit": "그릇", "quantity_g": 400}]"#,
            Ok("Add some vegetables."),
        );

        let report = computed(service.handle_message("쌀밥 한 공기랑 김치찌개").unwrap());
        let expected_energy = 143.0 * 2.1 + 48.0 * 4.0;
        assert!((report.calculated_nutrition.energy - expected_energy).abs() < 1e-9);
        assert!((report.calculated_nutrition.trans_fat - 0.08).abs() < 1e-9);
        assert_eq!(report.dietary_advice, "Add some vegetables.");
    }

    #[test]
    fn test_ambiguous_food_gates_whole_request() {
        let advice_calls = Arc::new(AtomicUsize::new(0));
        let counter = advice_calls.clone();
        let generator = FnGenerator::new(move |prompt: &str| {
            if prompt.starts_with(crate::llm::interpreter::PROMPT_INTRO) {
                Ok(r#"[{"name": "사과", "quantity": 1, "unit": "개", "quantity_g": 200},
                       {"name": "콩", "quantity": 100, "unit": "g", "quantity_g": 100}]"#
                    .to_string())
            } else {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("should not be asked".to_string())
            }
        });
        let service = ChatService::new(Arc::new(fixture_table()), Arc::new(generator));

        match service.handle_message("사과 하나랑 콩 100g").unwrap() {
            ChatReply::NeedsSelection(selection) => {
                assert_eq!(
                    selection.select_candidates,
                    vec![CandidateSet {
                        food_name: "콩".to_string(),
                        candidates: vec!["콩나물무침".to_string(), "콩국수".to_string()],
                    }]
                );
                assert_eq!(selection.parsed_food_list.len(), 2);
                assert_eq!(selection.parsed_food_list[0].name, "사과");
                assert_eq!(
                    selection.parsed_food_list[0].selected_food_code.as_deref(),
                    Some("F001")
                );
                assert_eq!(selection.parsed_food_list[1].name, "콩");
                assert_eq!(selection.parsed_food_list[1].selected_food_code, None);
            }
            other => panic!("expected selection request, got {:?}", other),
        }
        assert_eq!(advice_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_food_offered_as_literal_candidate() {
        let service = service(
            r#"[{"name": "마라탕", "quantity": 1, "unit": "그릇", "quantity_g": 500}]"#,
            Ok("ok"),
        );

        match service.handle_message("마라탕 한 그릇").unwrap() {
            ChatReply::NeedsSelection(selection) => {
                assert_eq!(selection.select_candidates, vec![CandidateSet::literal("마라탕")]);
                assert_eq!(
                    selection.parsed_food_list,
                    vec![ParsedFoodItem {
                        name: "마라탕".to_string(),
                        quantity: 1.0,
                        unit: "그릇".to_string(),
                        quantity_g: 500.0,
                        selected_food_code: None,
                    }]
                );
            }
            other => panic!("expected selection request, got {:?}", other),
        }
    }

    #[test]
    fn test_advice_failure_keeps_totals() {
        let service = service("[]", Err("model offline"));
        let report = computed(
            service
                .handle(ChatRequest {
                    message: None,
                    selected_foods: Some(vec![MealItem::new("사과", 100.0)]),
                })
                .unwrap(),
        );

        assert!((report.calculated_nutrition.energy - 57.0).abs() < 1e-9);
        assert!((report.calculated_nutrition.sugar - 11.0).abs() < 1e-9);
        assert_eq!(report.dietary_advice, ADVICE_FALLBACK);
        assert!(!report.dietary_advice.is_empty());
    }

    #[test]
    fn test_advice_requested_in_configured_language() {
        let generator = FnGenerator::new(|prompt: &str| {
            if prompt.contains("Write the whole answer in Japanese.") {
                Ok("ok".to_string())
            } else {
                Err(crate::llm::LlmError::Unavailable("wrong language".to_string()))
            }
        });
        let service = ChatService::new(Arc::new(fixture_table()), Arc::new(generator))
            .with_advice_language("Japanese");

        let report = computed(service.compute_selected(&[MealItem::new("사과", 100.0)]).unwrap());
        assert_eq!(report.dietary_advice, "ok");
    }

    #[test]
    fn test_selected_foods_take_precedence_over_message() {
        let service = service("not json", Ok("ok"));
        let reply = service
            .handle(ChatRequest {
                message: Some("ignored".to_string()),
                selected_foods: Some(vec![MealItem::new("쌀밥", 100.0)]),
            })
            .unwrap();
        assert!(matches!(reply, ChatReply::Computed(_)));
    }
}
