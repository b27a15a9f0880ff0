//! Built-in recipes served when the model is unavailable.

use super::response::{fallback_video_url, GeneratedRecipe};

struct Canned {
    title: &'static str,
    description: &'static str,
    cooking_time: i64,
    difficulty_level: &'static str,
    cuisine_type: &'static str,
    ingredients: &'static [&'static str],
    instructions: &'static [&'static str],
    required_ingredients: &'static [&'static str],
    video_id: &'static str,
}

impl Canned {
    fn to_recipe(&self) -> GeneratedRecipe {
        let video_url = if self.video_id.is_empty() {
            fallback_video_url(self.title)
        } else {
            format!("https://www.youtube.com/watch?v={}", self.video_id)
        };
        GeneratedRecipe {
            title: self.title.to_string(),
            description: self.description.to_string(),
            cooking_time: self.cooking_time,
            difficulty_level: self.difficulty_level.to_string(),
            cuisine_type: self.cuisine_type.to_string(),
            ingredients: owned(self.ingredients),
            instructions: owned(self.instructions),
            required_ingredients: owned(self.required_ingredients),
            video_url,
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const HAPPY: &[Canned] = &[
    Canned {
        title: "Colorful Summer Salad",
        description: "A vibrant and refreshing salad perfect for a sunny day",
        cooking_time: 15,
        difficulty_level: "Easy",
        cuisine_type: "Mediterranean",
        ingredients: &["Mixed greens", "Cherry tomatoes", "Avocado", "Cucumber", "Citrus dressing"],
        instructions: &[
            "Wash and chop all vegetables",
            "Mix greens in a large bowl",
            "Add tomatoes, avocado, and cucumber",
            "Drizzle with citrus dressing",
            "Toss gently and serve",
        ],
        required_ingredients: &["Mixed greens", "Cherry tomatoes", "Avocado"],
        video_id: "YN4VVjHx_v0",
    },
    Canned {
        title: "Berry Smoothie Bowl",
        description: "A delightful and nutritious breakfast bowl",
        cooking_time: 10,
        difficulty_level: "Easy",
        cuisine_type: "Healthy",
        ingredients: &["Mixed berries", "Banana", "Greek yogurt", "Honey", "Granola"],
        instructions: &[
            "Blend berries, banana, and yogurt",
            "Pour into a bowl",
            "Top with granola and honey",
            "Add fresh berries for garnish",
        ],
        required_ingredients: &["Mixed berries", "Banana", "Greek yogurt"],
        video_id: "rpNtKOTJ2BM",
    },
];

const STRESSED: &[Canned] = &[Canned {
    title: "Comforting Mac and Cheese",
    description: "Classic comfort food with a creamy cheese sauce",
    cooking_time: 30,
    difficulty_level: "Medium",
    cuisine_type: "American",
    ingredients: &["Macaroni", "Cheddar cheese", "Milk", "Butter", "Breadcrumbs"],
    instructions: &[
        "Cook macaroni according to package",
        "Make cheese sauce with butter, milk, and cheese",
        "Combine pasta and sauce",
        "Top with breadcrumbs",
        "Bake until golden",
    ],
    required_ingredients: &["Macaroni", "Cheddar cheese", "Milk"],
    video_id: "FUeyrEN14Rk",
}];

const PANTRY: &[Canned] = &[
    Canned {
        title: "Simple Pasta Dish",
        description: "A quick and easy pasta dish with common ingredients",
        cooking_time: 20,
        difficulty_level: "Easy",
        cuisine_type: "Italian",
        ingredients: &["Pasta", "Olive oil", "Garlic", "Salt", "Pepper", "Parmesan cheese"],
        instructions: &[
            "Boil pasta according to package instructions",
            "Sauté garlic in olive oil",
            "Combine pasta with garlic oil",
            "Season with salt and pepper",
            "Top with parmesan cheese",
        ],
        required_ingredients: &["Pasta", "Olive oil", "Garlic"],
        video_id: "",
    },
    Canned {
        title: "Basic Omelette",
        description: "A fluffy omelette that's perfect for any time of day",
        cooking_time: 15,
        difficulty_level: "Easy",
        cuisine_type: "French",
        ingredients: &["Eggs", "Butter", "Salt", "Pepper", "Cheese", "Herbs"],
        instructions: &[
            "Beat eggs with salt and pepper",
            "Melt butter in pan",
            "Pour eggs and cook until set",
            "Add cheese and fold",
            "Garnish with herbs",
        ],
        required_ingredients: &["Eggs", "Butter", "Salt"],
        video_id: "",
    },
    Canned {
        title: "Rice Stir-Fry",
        description: "A versatile stir-fry that works with any vegetables",
        cooking_time: 25,
        difficulty_level: "Medium",
        cuisine_type: "Asian Fusion",
        ingredients: &["Rice", "Vegetables", "Soy sauce", "Oil", "Garlic", "Ginger"],
        instructions: &[
            "Cook rice according to package instructions",
            "Stir-fry vegetables with garlic and ginger",
            "Add rice and soy sauce",
            "Mix well and serve hot",
        ],
        required_ingredients: &["Rice", "Vegetables", "Soy sauce"],
        video_id: "eY1FF6SEggk",
    },
];

/// Recipes for a mood. Unknown moods get the cheerful set.
pub fn mood_recipes(mood: &str) -> Vec<GeneratedRecipe> {
    let set = match mood.trim().to_lowercase().as_str() {
        "stressed" => STRESSED,
        _ => HAPPY,
    };
    set.iter().map(Canned::to_recipe).collect()
}

/// Everyday recipes for ingredient-based suggestions.
pub fn pantry_recipes() -> Vec<GeneratedRecipe> {
    PANTRY.iter().map(Canned::to_recipe).collect()
}
