use chrono::Utc;

use super::model::Recipe;
use crate::util::recipe_id;

struct SampleRecipe {
    title: &'static str,
    description: &'static str,
    ingredients: &'static [&'static str],
    instructions: &'static [&'static str],
    cooking_time: i64,
    cuisine_type: &'static str,
    difficulty_level: &'static str,
    servings: i64,
    video_url: Option<&'static str>,
}

const SAMPLES: &[SampleRecipe] = &[
    SampleRecipe {
        title: "Classic Spaghetti Carbonara",
        description: "A traditional Italian pasta dish with eggs, cheese, pancetta, and black pepper",
        ingredients: &[
            "400g spaghetti",
            "200g pancetta",
            "4 eggs",
            "100g parmesan cheese",
            "2 tsp black pepper",
            "1 tsp salt",
        ],
        instructions: &[
            "Boil pasta in salted water according to package instructions",
            "Fry pancetta until crispy",
            "Mix eggs, cheese, and pepper in a bowl",
            "Combine hot pasta with egg mixture and pancetta",
            "Serve immediately with extra cheese and pepper",
        ],
        cooking_time: 30,
        cuisine_type: "Italian",
        difficulty_level: "Medium",
        servings: 4,
        video_url: Some("https://www.youtube.com/watch?v=3AAdKl1UYZs"),
    },
    SampleRecipe {
        title: "Simple Chicken Stir-Fry",
        description: "Quick and healthy chicken stir-fry with vegetables",
        ingredients: &[
            "500g chicken breast",
            "300g broccoli",
            "2 carrots",
            "3 tbsp soy sauce",
            "3 cloves garlic",
            "1 tbsp ginger",
            "2 tbsp vegetable oil",
        ],
        instructions: &[
            "Cut chicken into bite-sized pieces",
            "Chop vegetables into similar sizes",
            "Heat oil in a wok or large frying pan",
            "Stir-fry chicken until cooked through",
            "Add vegetables and stir-fry until tender-crisp",
            "Add sauce and seasonings",
            "Serve hot with rice",
        ],
        cooking_time: 25,
        cuisine_type: "Asian",
        difficulty_level: "Easy",
        servings: 4,
        video_url: None,
    },
    SampleRecipe {
        title: "Classic Omelet",
        description: "A simple but delicious breakfast omelet",
        ingredients: &[
            "3 eggs",
            "2 tbsp milk",
            "1 tbsp butter",
            "50g cheese",
            "salt",
            "pepper",
        ],
        instructions: &[
            "Beat eggs with milk, salt, and pepper",
            "Melt butter in a non-stick pan",
            "Pour in egg mixture",
            "Add cheese when eggs begin to set",
            "Fold omelet in half",
            "Serve immediately",
        ],
        cooking_time: 10,
        cuisine_type: "International",
        difficulty_level: "Easy",
        servings: 1,
        video_url: None,
    },
    SampleRecipe {
        title: "Chicken Curry",
        description: "Aromatic and flavorful curry dish",
        ingredients: &[
            "500g chicken thighs",
            "2 tbsp curry powder",
            "400ml coconut milk",
            "1 onion",
        ],
        instructions: &[
            "Prepare ingredients",
            "Cook chicken",
            "Make sauce",
            "Simmer until done",
        ],
        cooking_time: 45,
        cuisine_type: "Indian",
        difficulty_level: "Medium",
        servings: 4,
        video_url: Some("https://www.youtube.com/watch?v=eY1FF6SEggk"),
    },
];

/// Recipes inserted into an empty database on startup.
pub fn sample_recipes() -> Vec<Recipe> {
    let now = Utc::now();
    SAMPLES
        .iter()
        .map(|s| Recipe {
            id: recipe_id(s.title),
            title: s.title.to_string(),
            description: Some(s.description.to_string()),
            ingredients: s.ingredients.iter().map(|i| i.to_string()).collect(),
            instructions: s.instructions.iter().map(|i| i.to_string()).collect(),
            cooking_time: s.cooking_time,
            cuisine_type: Some(s.cuisine_type.to_string()),
            difficulty_level: Some(s.difficulty_level.to_string()),
            servings: Some(s.servings),
            image_url: None,
            video_url: s.video_url.map(|u| u.to_string()),
            created_by: None,
            created: Some(now),
            updated: None,
        })
        .collect()
}
