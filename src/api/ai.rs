use axum::{extract::State, Json};
use tracing::warn;

use super::error::{ApiError, ApiResult};
use super::extract::ApiJson;
use super::types::AnalyzeRequest;
use crate::ai::{self, AnalyzedRecipe};
use crate::server::AppState;

fn analyze_failed(details: impl Into<String>) -> ApiError {
    ApiError::bad_request("Failed to analyze recipe").with_details(details)
}

pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzedRecipe>> {
    let Some(prompt) = req.prompt.filter(|p| !p.trim().is_empty()) else {
        return Err(analyze_failed("Prompt is required"));
    };
    let Some(ref generator) = state.ai else {
        return Err(analyze_failed("AI service is not configured"));
    };

    match ai::analyze_recipe(generator.as_ref(), &prompt).await {
        Ok(recipe) => Ok(Json(recipe)),
        Err(e) => {
            warn!("AI analysis error: {}", e);
            Err(analyze_failed(e.to_string()))
        }
    }
}
