use serde::{Deserialize, Serialize};

/// One row of the recipe table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    #[serde(rename = "RecipeName")]
    pub name: String,
    #[serde(rename = "cleaned_ings")]
    pub ingredients: String,
    #[serde(rename = "Instructions")]
    pub instructions: String,
    #[serde(rename = "TotalTimeInMins")]
    pub time: u32,
    #[serde(rename = "Servings")]
    pub servings: u32,
    #[serde(rename = "Diet")]
    pub diet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeMetadata {
    pub name: String,
    pub time: u32,
    pub servings: u32,
    pub diet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeDocument {
    pub id: u64,
    pub content: String,
    pub metadata: RecipeMetadata,
}

impl RecipeDocument {
    pub fn from_recipe(id: u64, recipe: Recipe) -> Self {
        let content = format!(
            "Recipe: {}\nIngredients: {}\nInstructions: {}",
            recipe.name, recipe.ingredients, recipe.instructions
        );

        Self {
            id,
            content,
            metadata: RecipeMetadata {
                name: recipe.name,
                time: recipe.time,
                servings: recipe.servings,
                diet: recipe.diet,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub document: RecipeDocument,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub ingredients: Vec<String>,
    #[serde(default = "default_constraints")]
    pub constraints: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub chef_advice: String,
}

fn default_constraints() -> String {
    "None".to_string()
}
