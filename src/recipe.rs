//! # Recipe Book Module
//!
//! Recipes and their required ingredients, as produced by the external
//! scraping/parsing pipelines. The book is read-only for the session.
//! Meal-slot eligibility is inferred from the free-text category label
//! exactly once, when the book is built, so scheduling never re-parses
//! category strings.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{PantryError, PantryResult};
use crate::model::MealSlot;

/// Slots assigned when a category label matches no slot keyword
pub const FALLBACK_SLOTS: [MealSlot; 2] = [MealSlot::Lunch, MealSlot::Dinner];

/// One requirement line of a recipe, already resolved against the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredIngredient {
    /// Ingredient name as written in the recipe
    pub name: String,

    /// Original recipe line, when the parser kept it
    #[serde(default)]
    pub raw_text: Option<String>,

    /// Catalog product this ingredient maps to; None means external,
    /// not tracked against inventory (spices, water, etc.)
    #[serde(default)]
    pub matched_product_id: Option<i64>,

    /// Required quantity, in pantry units of the matched product
    pub quantity: f64,

    /// Required unit label
    pub unit: String,
}

/// A recipe with its requirement list and derived scheduling slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe id
    pub id: i64,

    /// Recipe title
    pub title: String,

    /// Free-text category label from the source site
    pub category: String,

    /// Source page, if known
    #[serde(default)]
    pub url: Option<String>,

    /// Hero image, if known
    #[serde(default)]
    pub image_url: Option<String>,

    /// Servings, if known
    #[serde(default)]
    pub serves: Option<u32>,

    /// Preparation time label, if known
    #[serde(default)]
    pub time: Option<String>,

    /// Requirement lines, in recipe order
    pub ingredients: Vec<RequiredIngredient>,

    /// Meal slots this recipe may occupy; computed when the book is built
    #[serde(default)]
    pub slots: Vec<MealSlot>,
}

impl Recipe {
    /// Requirement lines with a non-null matched product
    pub fn matched_ingredients(&self) -> impl Iterator<Item = &RequiredIngredient> {
        self.ingredients
            .iter()
            .filter(|ing| ing.matched_product_id.is_some())
    }

    /// Number of external (untracked) requirement lines
    pub fn external_count(&self) -> usize {
        self.ingredients
            .iter()
            .filter(|ing| ing.matched_product_id.is_none())
            .count()
    }

    /// Check whether the recipe may occupy the given slot
    pub fn allows_slot(&self, slot: MealSlot) -> bool {
        self.slots.contains(&slot)
    }
}

/// In-memory, immutable recipe collection
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
    by_id: HashMap<i64, usize>,
}

impl RecipeBook {
    /// Build a book from a recipe list, computing meal-slot eligibility.
    ///
    /// Slot inference runs here and only here; recipes whose category text
    /// matches no slot keyword fall back to [`FALLBACK_SLOTS`].
    pub fn new(mut recipes: Vec<Recipe>) -> Self {
        for recipe in &mut recipes {
            recipe.slots = MealSlot::infer(&recipe.category);
            if recipe.slots.is_empty() {
                recipe.slots = FALLBACK_SLOTS.to_vec();
            }
            debug!(
                "Recipe {} '{}' eligible for slots {:?}",
                recipe.id, recipe.title, recipe.slots
            );
        }
        let by_id = recipes
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.id, idx))
            .collect();
        info!("Recipe book loaded with {} recipes", recipes.len());
        Self { recipes, by_id }
    }

    /// Parse a book from a JSON array of recipes
    pub fn from_json_str(json: &str) -> Result<Self> {
        let recipes: Vec<Recipe> =
            serde_json::from_str(json).context("Failed to parse recipe JSON")?;
        Ok(Self::new(recipes))
    }

    /// Load a book from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read recipe file: {}", path.as_ref().display())
        })?;
        Self::from_json_str(&json)
    }

    /// Look up a recipe by id
    pub fn get(&self, recipe_id: i64) -> PantryResult<&Recipe> {
        self.by_id
            .get(&recipe_id)
            .map(|&idx| &self.recipes[idx])
            .ok_or_else(|| PantryError::NotFound(format!("recipe {recipe_id}")))
    }

    /// All recipes, in load order
    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Number of recipes in the book
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Check whether the book is empty
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: i64, title: &str, category: &str) -> Recipe {
        Recipe {
            id,
            title: title.to_string(),
            category: category.to_string(),
            url: None,
            image_url: None,
            serves: None,
            time: None,
            ingredients: vec![
                RequiredIngredient {
                    name: "chicken thighs".to_string(),
                    raw_text: None,
                    matched_product_id: Some(1),
                    quantity: 3.0,
                    unit: "oz".to_string(),
                },
                RequiredIngredient {
                    name: "salt".to_string(),
                    raw_text: None,
                    matched_product_id: None,
                    quantity: 1.0,
                    unit: "tsp".to_string(),
                },
            ],
            slots: Vec::new(),
        }
    }

    #[test]
    fn test_book_assigns_slots_at_load() {
        let book = RecipeBook::new(vec![
            recipe(1, "Sheet Pan Chicken", "Quick Dinners"),
            recipe(2, "Morning Oats", "Breakfast & Brunch"),
        ]);
        assert_eq!(book.get(1).unwrap().slots, vec![MealSlot::Dinner]);
        assert_eq!(book.get(2).unwrap().slots, vec![MealSlot::Breakfast]);
    }

    #[test]
    fn test_book_slot_fallback_for_unmatched_category() {
        let book = RecipeBook::new(vec![recipe(1, "Weeknight Pasta", "Vegetarian")]);
        assert_eq!(book.get(1).unwrap().slots, FALLBACK_SLOTS.to_vec());
    }

    #[test]
    fn test_get_missing_recipe() {
        let book = RecipeBook::new(vec![recipe(1, "Sheet Pan Chicken", "Dinner")]);
        assert!(matches!(book.get(9), Err(PantryError::NotFound(_))));
    }

    #[test]
    fn test_matched_and_external_counts() {
        let book = RecipeBook::new(vec![recipe(1, "Sheet Pan Chicken", "Dinner")]);
        let r = book.get(1).unwrap();
        assert_eq!(r.matched_ingredients().count(), 1);
        assert_eq!(r.external_count(), 1);
        assert!(r.allows_slot(MealSlot::Dinner));
        assert!(!r.allows_slot(MealSlot::Breakfast));
    }

    #[test]
    fn test_from_json_str_recomputes_slots() -> Result<()> {
        let json = r#"[
            {"id": 3, "title": "Berry Smoothie", "category": "Smoothies & Juices",
             "ingredients": [
                {"name": "frozen berries", "matched_product_id": 7,
                 "quantity": 2.0, "unit": "cup"}
             ],
             "slots": ["dinner"]}
        ]"#;
        let book = RecipeBook::from_json_str(json)?;
        // Load-time inference overrides whatever the file claimed.
        assert_eq!(book.get(3).unwrap().slots, vec![MealSlot::Beverage]);
        Ok(())
    }
}
