use serde::{Deserialize, Serialize};

use crate::ai::GeneratedRecipe;
use crate::ingredients::Pantry;

/// A generated recipe as handed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedRecipe {
    pub id: String,
    #[serde(flatten)]
    pub recipe: GeneratedRecipe,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_ingredients: Vec<String>,
}

impl SuggestedRecipe {
    /// Every suggestion gets its own id, even when titles repeat.
    pub fn new(recipe: GeneratedRecipe) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            recipe,
            missing_ingredients: Vec::new(),
        }
    }

    /// Record which required ingredients the pantry lacks.
    pub fn check_pantry(mut self, pantry: &Pantry) -> Self {
        self.missing_ingredients = pantry.missing(&self.recipe.required_ingredients);
        self
    }
}

/// Give each recipe an id and attach what the pantry lacks. Nothing is
/// dropped, however many ingredients are missing.
pub fn match_pantry(recipes: Vec<GeneratedRecipe>, pantry: &Pantry) -> Vec<SuggestedRecipe> {
    recipes
        .into_iter()
        .map(|recipe| SuggestedRecipe::new(recipe).check_pantry(pantry))
        .collect()
}
