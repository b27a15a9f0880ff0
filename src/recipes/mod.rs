//! Suggested recipes and the cache that lets clients fetch them by id.

mod cache;
mod suggest;

pub use cache::RecipeCache;
pub use suggest::{match_pantry, SuggestedRecipe};

pub type SuggestionCache = RecipeCache<SuggestedRecipe>;

/// Make suggestions retrievable through the recipe detail endpoint.
pub async fn remember(cache: &SuggestionCache, recipes: &[SuggestedRecipe]) {
    for recipe in recipes {
        cache.insert(recipe.id.clone(), recipe.clone()).await;
    }
}
