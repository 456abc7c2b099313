//! REST API using Axum
//!
//! - `POST /chat` meal parsing, candidate selection and nutrition advice
//! - `GET /health` liveness plus reference record count
//! - `GET /status` build and process information

pub mod handlers;

pub use handlers::AppState;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the CORS layer
///
/// `None` allows any origin. Otherwise only the listed origins are allowed.
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match origins {
        Some(origins) => {
            let allowed: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            tracing::info!(origins = ?origins, "CORS: allowing configured origins");
            layer.allow_origin(allowed)
        }
        None => layer.allow_origin(Any),
    }
}

/// Create the application router
pub fn create_app(state: AppState, cors_origins: Option<&[String]>) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatService;
    use crate::status::StatusTracker;
    use crate::test_utils::{fixture_table, scripted_generator};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(meal_json: &str) -> Router {
        let table = Arc::new(fixture_table());
        let generator = scripted_generator(meal_json, Ok("Eat more greens."));
        let chat = ChatService::new(table.clone(), Arc::new(generator));
        let status = Arc::new(StatusTracker::new(PathBuf::from("fixture.json"), table.len()));
        create_app(AppState::new(chat, status), None)
    }

    fn post_chat(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app("[]")
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["records"], 6);
    }

    #[tokio::test]
    async fn test_status() {
        let response = app("[]")
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["nutrition_records"], 6);
        assert_eq!(body["nutrition_path"], "fixture.json");
    }

    #[tokio::test]
    async fn test_selected_foods_computed() {
        let response = app("[]")
            .oneshot(post_chat(r#"{"selected_foods": [{"name": "두부", "quantity_g": 150}]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let energy = body["calculated_nutrition"]["energy"].as_f64().unwrap();
        assert!((energy - 150.0).abs() < 1e-9);
        assert_eq!(body["dietary_advice"], "Eat more greens.");
    }

    #[tokio::test]
    async fn test_ambiguous_message_returns_candidates() {
        let meal = r#"[{"name": "사과", "quantity": 1, "unit": "개", "quantity_g": 200},
                       {"name": "콩", "quantity": 1, "unit": "그릇", "quantity_g": 300}]"#;
        let response = app(meal)
            .oneshot(post_chat(r#"{"message": "사과 하나랑 콩 한 그릇"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["select_candidates"][0]["food_name"], "콩");
        assert_eq!(body["select_candidates"][0]["candidates"][1], "콩국수");
        assert_eq!(body["parsed_food_list"][0]["selected_food_code"], "F001");
        assert!(body["parsed_food_list"][1].get("selected_food_code").is_none());
        assert_eq!(body["parsed_food_list"][1]["quantity_g"], 300.0);
        assert!(body.get("calculated_nutrition").is_none());
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let response = app("[]").oneshot(post_chat(r#"{"message": ""}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("message"));
    }

    #[tokio::test]
    async fn test_unparseable_message_is_bad_request() {
        let response = app("no foods here")
            .oneshot(post_chat(r#"{"message": "뭔가 먹었어"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unresolvable_selection_is_bad_request() {
        let response = app("[]")
            .oneshot(post_chat(r#"{"selected_foods": [{"name": "마라탕", "quantity_g": 400}]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let response = app("[]").oneshot(post_chat("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }
}
