//! Language model collaborators
//!
//! The model is an opaque text oracle behind [`TextGenerator`]. Two narrow
//! uses are built on top of it:
//!
//! - [`interpreter`]: meal description -> structured food list
//! - [`advice`]: nutrient totals -> free-text dietary advice
//!
//! [`GeminiClient`] is the production backend. Calls are blocking; callers on
//! an async runtime run them on the blocking pool.

pub mod advice;
pub mod gemini;
pub mod interpreter;

use thiserror::Error;

pub use advice::{generate_advice, ADVICE_FALLBACK};
pub use gemini::GeminiClient;
pub use interpreter::{parse_meal, ParseFailure};

/// Model call error types
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode model API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No text content in model response")]
    EmptyResponse,

    #[error("Model unavailable: {0}")]
    Unavailable(String),
}

/// Blocking text generation backend
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a single prompt
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}
