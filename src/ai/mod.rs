//! Recipe suggestions from a generative text model.

pub mod fallback;
pub mod gemini;
pub mod prompts;
pub mod response;

use async_trait::async_trait;

pub use gemini::GeminiClient;
pub use response::{AnalyzedRecipe, GeneratedRecipe};

/// A text-in, text-out model endpoint.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("No content in model response")]
    EmptyResponse,
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
    #[error("Response missing recipes array")]
    MissingRecipes,
    #[error("{0}")]
    Validation(String),
}

/// Ask the model for recipes and repair its answer into a recipe list.
pub async fn generate_recipes(
    generator: &dyn RecipeGenerator,
    request: &str,
) -> Result<Vec<GeneratedRecipe>, AiError> {
    let text = generator.complete(&prompts::chef_prompt(request)).await?;
    response::parse_recipes(&text)
}

/// Ask the model to describe a single recipe and validate the result.
pub async fn analyze_recipe(
    generator: &dyn RecipeGenerator,
    prompt: &str,
) -> Result<AnalyzedRecipe, AiError> {
    let text = generator.complete(prompt).await?;
    let value = response::extract_json(&text)?;
    response::validate_analysis(&value)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Generator returning a canned answer and recording the prompts it saw.
    pub struct CannedGenerator {
        pub answer: Result<String, String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        pub fn ok(answer: &str) -> Self {
            Self {
                answer: Ok(answer.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                answer: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecipeGenerator for CannedGenerator {
        async fn complete(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.clone().map_err(|message| AiError::Api { status: 500, message })
        }
    }
}
