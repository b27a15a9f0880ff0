use serde_json::Value;

const CHEF_PREAMBLE: &str = r#"You are a helpful chef that provides recipe recommendations.
Always respond with properly formatted JSON following the exact structure provided.
Do not include any additional text, markdown formatting, or explanations.
Ensure all JSON properties match the specified format exactly.
For each recipe, you MUST include a valid YouTube video URL showing how to make the dish.
Search for popular cooking channels like "Tasty", "Food Network", or "Bon Appetit" for the video URLs.

Example response format:
{
    "recipes": [
        {
            "title": "Recipe Name",
            "description": "Brief description",
            "cookingTime": 30,
            "difficultyLevel": "Easy/Medium/Hard",
            "cuisineType": "Type of cuisine",
            "ingredients": ["ingredient1", "ingredient2"],
            "instructions": ["Step 1", "Step 2"],
            "requiredIngredients": ["Only the ingredients needed"],
            "videoUrl": "https://www.youtube.com/watch?v=VALID_VIDEO_ID"
        }
    ]
}"#;

const RECIPE_SHAPE: &str = r#"{
    "recipes": [
        {
            "title": "Recipe Name",
            "description": "A brief and clear description",
            "cookingTime": 30,
            "difficultyLevel": "Easy/Medium/Hard",
            "cuisineType": "Type of cuisine",
            "ingredients": ["ingredient1", "ingredient2", "..."],
            "instructions": ["Step 1", "Step 2", "..."],
            "requiredIngredients": ["main ingredient1", "main ingredient2"],
            "videoUrl": "A YouTube video URL showing how to make this dish (e.g., https://www.youtube.com/watch?v=...)"
        }
    ]
}"#;

/// Wrap a request in the fixed chef instructions.
pub fn chef_prompt(request: &str) -> String {
    format!("{}\n\n{}", CHEF_PREAMBLE, request)
}

pub fn mood_prompt(mood: &str, preferences: Option<&Value>) -> String {
    let preferences = preferences
        .map(|p| p.to_string())
        .unwrap_or_else(|| "{}".to_string());

    format!(
        r#"Generate exactly 3 recipes for a user who is feeling "{mood}" with these preferences: {preferences}.

Return ONLY a JSON object with this exact structure:
{RECIPE_SHAPE}

Rules:
1. Generate exactly 3 recipes
2. All fields are required
3. cookingTime must be a number in minutes
4. difficultyLevel must be one of: Easy, Medium, Hard
5. ingredients and instructions must be arrays of strings
6. requiredIngredients should list only the essential ingredients
7. videoUrl should be a valid YouTube video URL showing how to make this specific dish
8. Response must be valid JSON
9. Do not include any text outside the JSON structure"#
    )
}

pub fn ingredients_prompt(ingredients: &[String], max_additional: Option<u32>) -> String {
    let mut prompt = format!(
        "Given these ingredients: {}.\nPlease suggest 3 recipes that can be made with these ingredients.\n",
        ingredients.join(", ")
    );
    if let Some(max) = max_additional {
        prompt.push_str(&format!(
            "If possible, also suggest recipes that require up to {} additional ingredients.\n",
            max
        ));
    }
    prompt.push_str(&format!(
        "\nFormat the response as a JSON object with a 'recipes' array. Each recipe must have:\n{}\n\n\
         The response must be valid JSON and follow this exact format. \
         Do not include any additional text or explanations outside the JSON structure.",
        RECIPE_SHAPE
    ));
    prompt
}
