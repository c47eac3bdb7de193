use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{Recipe, RecipeDocument};

/// Reads every recipe row; the first row that fails to parse aborts the load.
pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open recipe table {}", path.display()))?;

    let mut recipes = Vec::new();
    for (row, record) in reader.deserialize::<Recipe>().enumerate() {
        let recipe =
            record.with_context(|| format!("malformed recipe row {} in {}", row + 1, path.display()))?;
        recipes.push(recipe);
    }

    Ok(recipes)
}

pub fn build_documents(recipes: Vec<Recipe>) -> Vec<RecipeDocument> {
    recipes
        .into_iter()
        .enumerate()
        .map(|(i, recipe)| RecipeDocument::from_recipe(i as u64, recipe))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "RecipeName,cleaned_ings,Instructions,TotalTimeInMins,Servings,Diet";

    #[test]
    fn loads_one_recipe_per_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "Pancakes,\"egg, flour, milk\",Whisk and fry.,20,4,Vegetarian").unwrap();
        writeln!(file, "Jeera Rice,\"rice, cumin\",Temper and boil., 25 ,3,Vegan").unwrap();

        let recipes = load_recipes(file.path()).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].ingredients, "egg, flour, milk");
        assert_eq!(recipes[1].time, 25);

        let documents = build_documents(recipes);
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1].id, 1);
        assert_eq!(documents[1].metadata.name, "Jeera Rice");
    }

    #[test]
    fn missing_column_aborts_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "RecipeName,cleaned_ings,Instructions,TotalTimeInMins,Servings").unwrap();
        writeln!(file, "Pancakes,egg,Fry.,20,4").unwrap();

        let err = load_recipes(file.path()).unwrap_err();
        assert!(err.to_string().contains("malformed recipe row 1"));
    }

    #[test]
    fn non_numeric_time_aborts_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "Pancakes,egg,Fry.,20,4,Vegetarian").unwrap();
        writeln!(file, "Upma,semolina,Roast.,quick,2,Vegetarian").unwrap();

        let err = load_recipes(file.path()).unwrap_err();
        assert!(err.to_string().contains("malformed recipe row 2"));
    }
}
