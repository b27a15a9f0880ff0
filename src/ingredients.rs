//! Ingredient normalization and pantry matching.
//!
//! Ingredient names arrive as free text ("2 cups flour", "fresh basil
//! leaves"). They are reduced to a comparison form and a recipe's required
//! ingredients are checked against what the user has on hand using
//! substring containment in both directions.

use regex::Regex;
use std::sync::OnceLock;

static QUANTITY_PATTERN: OnceLock<Regex> = OnceLock::new();
static FILLER_PATTERN: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_PATTERN: OnceLock<Regex> = OnceLock::new();
static PLURAL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn quantity_pattern() -> &'static Regex {
    QUANTITY_PATTERN.get_or_init(|| {
        Regex::new(
            r"[0-9]+(?:\.[0-9]+)?\s*(?:g|kg|ml|l|cup|cups|tbsp|tsp|teaspoon|tablespoon|pound|lb|oz|ounce)s?\b",
        )
        .unwrap()
    })
}

fn filler_pattern() -> &'static Regex {
    FILLER_PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:fresh|dried|chopped|sliced|diced|minced|ground|powdered|of)\b").unwrap()
    })
}

fn whitespace_pattern() -> &'static Regex {
    WHITESPACE_PATTERN.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn plural_pattern() -> &'static Regex {
    PLURAL_PATTERN.get_or_init(|| Regex::new(r"s\b").unwrap())
}

/// Reduce an ingredient name to its comparison form.
///
/// Quantities with units and descriptor words are dropped, whitespace is
/// collapsed and a trailing "s" is cut from every word. The plural handling
/// is deliberately naive: "citrus" becomes "citru".
pub fn normalize(raw: &str) -> String {
    let text = raw.to_lowercase();
    let text = text.trim();
    let text = quantity_pattern().replace_all(text, "");
    let text = filler_pattern().replace_all(&text, "");
    let text = whitespace_pattern().replace_all(&text, " ");
    let text = plural_pattern().replace_all(&text, "");
    text.trim().to_string()
}

/// A raw ingredient string paired with its normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientToken {
    pub raw: String,
    pub normalized: String,
}

impl IngredientToken {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            normalized: normalize(raw),
        }
    }

    /// Containment in either direction. An empty normalized form matches
    /// anything.
    pub fn matches(&self, other: &IngredientToken) -> bool {
        self.normalized.contains(other.normalized.as_str())
            || other.normalized.contains(self.normalized.as_str())
    }
}

/// The ingredients a user has on hand, normalized once so the same pantry
/// can be checked against several recipes.
#[derive(Debug, Clone, Default)]
pub struct Pantry {
    items: Vec<IngredientToken>,
}

impl Pantry {
    pub fn new<S: AsRef<str>>(items: &[S]) -> Self {
        Self {
            items: items
                .iter()
                .map(|item| IngredientToken::new(item.as_ref()))
                .collect(),
        }
    }

    pub fn normalized(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|t| t.normalized.as_str())
    }

    pub fn satisfies(&self, ingredient: &IngredientToken) -> bool {
        self.items.iter().any(|have| ingredient.matches(have))
    }

    /// Required ingredients with no match in the pantry, in their original
    /// order and spelling.
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(|r| IngredientToken::new(r.as_ref()))
            .filter(|token| !self.satisfies(token))
            .map(|token| token.raw)
            .collect()
    }
}

/// Return the entries of `required` that nothing in `pantry` satisfies.
pub fn find_missing<R, P>(required: &[R], pantry: &[P]) -> Vec<String>
where
    R: AsRef<str>,
    P: AsRef<str>,
{
    Pantry::new(pantry).missing(required)
}
