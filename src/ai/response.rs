//! Turning model output into recipe data.
//!
//! Models do not reliably return clean JSON. Answers are stripped of code
//! fences and trailing commas before parsing, and every recipe is filled in
//! with defaults so downstream code can rely on all fields being present.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use super::AiError;

const VIDEO_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Known videos for common dishes, checked in order against the title.
const COMMON_RECIPE_VIDEOS: &[(&str, &str)] = &[
    ("pasta", "bJUiWdM__Qw"),
    ("omelette", "OQyRuOEKfVk"),
    ("stir fry", "eY1FF6SEggk"),
    ("curry", "HOM-EQvrHMc"),
    ("rice", "KnBj4Dp0vbM"),
    ("chicken", "yKAM5-ZuRpo"),
];
const DEFAULT_VIDEO_ID: &str = "eY1FF6SEggk";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    pub title: String,
    pub description: String,
    pub cooking_time: i64,
    pub difficulty_level: String,
    pub cuisine_type: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub required_ingredients: Vec<String>,
    pub video_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: i64,
    pub difficulty_level: String,
    pub cuisine_type: String,
}

static FENCE_OPEN_JSON: OnceLock<Regex> = OnceLock::new();
static FENCE_OPEN: OnceLock<Regex> = OnceLock::new();
static FENCE_CLOSE: OnceLock<Regex> = OnceLock::new();
static TRAILING_COMMA: OnceLock<Regex> = OnceLock::new();
static JSON_OBJECT: OnceLock<Regex> = OnceLock::new();
static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
static WHITESPACE: OnceLock<Regex> = OnceLock::new();

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// Strip markdown fences and trailing commas from a model answer.
pub fn clean_response(text: &str) -> String {
    let text = text.trim();
    let text = regex(&FENCE_OPEN_JSON, r"^```json\s*").replace(text, "");
    let text = regex(&FENCE_OPEN, r"^```\s*").replace(&text, "");
    let text = regex(&FENCE_CLOSE, r"```$").replace(&text, "");
    let text = regex(&TRAILING_COMMA, r",(\s*[}\]])").replace_all(&text, "$1");
    text.trim().to_string()
}

/// Parse a cleaned answer of the form `{"recipes": [...]}`.
pub fn parse_recipes(text: &str) -> Result<Vec<GeneratedRecipe>, AiError> {
    let cleaned = clean_response(text);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| AiError::InvalidJson(e.to_string()))?;

    let recipes = value
        .get("recipes")
        .and_then(Value::as_array)
        .ok_or(AiError::MissingRecipes)?;

    Ok(recipes.iter().map(normalize_recipe).collect())
}

/// Fill in defaults for a single recipe object.
pub fn normalize_recipe(recipe: &Value) -> GeneratedRecipe {
    let title = non_empty_str(recipe.get("title")).unwrap_or("Untitled Recipe");

    let ingredients = string_list(recipe.get("ingredients"))
        .map(|list| trim_all(&list))
        .unwrap_or_default();
    let required_ingredients = string_list(recipe.get("requiredIngredients"))
        .map(|list| trim_all(&list))
        .unwrap_or_else(|| ingredients.clone());

    let video_url = match recipe.get("videoUrl").and_then(Value::as_str) {
        Some(url) if url.contains("youtube.com/watch?v=") => url.to_string(),
        _ => fallback_video_url(title),
    };

    GeneratedRecipe {
        title: title.to_string(),
        description: non_empty_str(recipe.get("description"))
            .unwrap_or("No description available")
            .to_string(),
        cooking_time: number(recipe.get("cookingTime")).unwrap_or(30),
        difficulty_level: non_empty_str(recipe.get("difficultyLevel"))
            .unwrap_or("Medium")
            .to_string(),
        cuisine_type: non_empty_str(recipe.get("cuisineType"))
            .unwrap_or("Global")
            .to_string(),
        ingredients,
        instructions: string_list(recipe.get("instructions")).unwrap_or_default(),
        required_ingredients,
        video_url,
    }
}

/// Lowercase, letters/digits/spaces only, single-spaced.
pub fn search_title(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = regex(&NON_ALNUM, r"[^a-z0-9\s]").replace_all(&lower, "");
    regex(&WHITESPACE, r"\s+")
        .replace_all(stripped.trim(), " ")
        .to_string()
}

pub fn fallback_video_url(title: &str) -> String {
    let key = search_title(title);
    let id = COMMON_RECIPE_VIDEOS
        .iter()
        .find(|(dish, _)| key.contains(dish))
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_VIDEO_ID);
    format!("{}{}", VIDEO_URL_PREFIX, id)
}

/// Parse the answer as JSON, or failing that the outermost `{...}` in it.
pub fn extract_json(text: &str) -> Result<Value, AiError> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    let m = regex(&JSON_OBJECT, r"(?s)\{.*\}")
        .find(text)
        .ok_or_else(|| AiError::InvalidJson("No JSON found in response".to_string()))?;

    serde_json::from_str(m.as_str())
        .map_err(|_| AiError::InvalidJson("Could not parse JSON from response".to_string()))
}

/// Check a single-recipe answer for the fields the client needs.
pub fn validate_analysis(data: &Value) -> Result<AnalyzedRecipe, AiError> {
    let required = [
        "title",
        "ingredients",
        "instructions",
        "cookingTime",
        "difficultyLevel",
        "cuisineType",
    ];
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| !data.get(*field).map(is_truthy).unwrap_or(false))
        .collect();
    if !missing.is_empty() {
        return Err(AiError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let (Some(ingredients), Some(instructions)) = (
        data.get("ingredients").and_then(Value::as_array),
        data.get("instructions").and_then(Value::as_array),
    ) else {
        return Err(AiError::Validation(
            "Ingredients and instructions must be arrays".to_string(),
        ));
    };

    Ok(AnalyzedRecipe {
        title: display(&data["title"]),
        ingredients: ingredients.iter().map(display).collect(),
        instructions: instructions.iter().map(display).collect(),
        cooking_time: number(data.get("cookingTime")).unwrap_or(30),
        difficulty_level: display(&data["difficultyLevel"]),
        cuisine_type: display(&data["cuisineType"]),
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(display).collect())
}

fn trim_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.trim().to_string()).collect()
}

/// Positive whole minutes from a number or numeric string. Zero counts as absent.
fn number(value: Option<&Value>) -> Option<i64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() || n as i64 == 0 {
        return None;
    }
    Some(n as i64)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
