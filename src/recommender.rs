//! # Recipe Recommender Module
//!
//! Ranks the recipe book against a pantry snapshot and returns the
//! top waste-reducing candidates. Works equally over the real snapshot
//! and a projected one, which is how queued meals stop the same stock
//! being recommended twice.

use chrono::{DateTime, Utc};
use log::info;
use std::cmp::Ordering;

use crate::model::SnapshotItem;
use crate::recipe::RecipeBook;
use crate::recipe_match::{score_recipe, RecipeScore};
use crate::waste_score::WasteScorer;

/// Filter and size settings for one recommendation pass
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendOptions {
    /// Most missing ingredients a candidate may have
    pub max_missing: usize,

    /// Case-insensitive substring filter on the recipe category label
    pub category_filter: Option<String>,

    /// Number of recommendations to return
    pub limit: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            max_missing: 2,
            category_filter: None,
            limit: 5,
        }
    }
}

/// One ranked recommendation, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Recipe title for display
    pub title: String,

    /// Recipe category label for display
    pub category: String,

    /// Match result the ranking is based on
    pub result: RecipeScore,
}

impl Recommendation {
    /// Recipe id of the recommended recipe
    pub fn recipe_id(&self) -> i64 {
        self.result.recipe_id
    }
}

/// Rank recipes against a snapshot at the given instant.
///
/// Candidates must use at least one pantry ingredient (`matched_count > 0`
/// and positive score) and fall within `max_missing`. Survivors are
/// sorted descending by score; equal scores keep the book's load order.
pub fn recommend(
    recipes: &RecipeBook,
    snapshot: &[SnapshotItem],
    scorer: &WasteScorer,
    options: &RecommendOptions,
    now: DateTime<Utc>,
) -> Vec<Recommendation> {
    let needle = options.category_filter.as_ref().map(|c| c.to_lowercase());

    let mut candidates: Vec<Recommendation> = recipes
        .all()
        .iter()
        .filter(|recipe| match &needle {
            Some(needle) => recipe.category.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .map(|recipe| Recommendation {
            title: recipe.title.clone(),
            category: recipe.category.clone(),
            result: score_recipe(recipe, snapshot, scorer, now),
        })
        .filter(|rec| {
            rec.result.matched_count > 0
                && rec.result.missing_count <= options.max_missing
                && rec.result.score > 0.0
        })
        .collect();

    // Stable sort keeps load order among equal scores
    candidates.sort_by(|a, b| {
        b.result
            .score
            .partial_cmp(&a.result.score)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(options.limit);

    info!(
        "Recommending {} of {} recipes (max_missing={}, category={:?})",
        candidates.len(),
        recipes.len(),
        options.max_missing,
        options.category_filter
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Product};
    use crate::recipe::{Recipe, RequiredIngredient};
    use crate::waste_score::CategoryWeights;
    use chrono::Duration;

    fn product(id: i64, name: &str, category: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            norm_name: None,
            unit: "oz".to_string(),
            package_quantity: 16.0,
            price: None,
            url: None,
            category: category.to_string(),
            sub_category: None,
            shelf_life_days: Some(7),
        }
    }

    fn recipe(id: i64, title: &str, category: &str, needs: &[(Option<i64>, f64)]) -> Recipe {
        Recipe {
            id,
            title: title.to_string(),
            category: category.to_string(),
            url: None,
            image_url: None,
            serves: None,
            time: None,
            ingredients: needs
                .iter()
                .map(|&(pid, qty)| RequiredIngredient {
                    name: format!("ingredient {pid:?}"),
                    raw_text: None,
                    matched_product_id: pid,
                    quantity: qty,
                    unit: "oz".to_string(),
                })
                .collect(),
            slots: Vec::new(),
        }
    }

    fn item(product_id: i64, quantity: f64, hours: i64, now: DateTime<Utc>) -> SnapshotItem {
        SnapshotItem {
            product_id,
            quantity,
            expiration: now + Duration::hours(hours),
        }
    }

    fn setup() -> (Catalog, CategoryWeights) {
        let catalog = Catalog::new(vec![
            product(1, "Chicken Thighs", "meat"),
            product(2, "Baby Spinach", "fresh produce"),
            product(3, "Arborio Rice", "for the pantry"),
        ]);
        (catalog, CategoryWeights::default())
    }

    #[test]
    fn test_orders_by_urgency_and_limits() {
        let (catalog, weights) = setup();
        let scorer = WasteScorer::new(&catalog, &weights);
        let now = Utc::now();

        let book = RecipeBook::new(vec![
            recipe(1, "Rice Bowl", "Dinner", &[(Some(3), 2.0)]),
            recipe(2, "Chicken Skillet", "Dinner", &[(Some(1), 2.0)]),
            recipe(3, "Spinach Salad", "Lunch", &[(Some(2), 2.0)]),
        ]);
        let snapshot = vec![
            item(1, 5.0, 24, now),
            item(2, 5.0, 24, now),
            item(3, 5.0, 24, now),
        ];

        let recs = recommend(&book, &snapshot, &scorer, &RecommendOptions::default(), now);
        // Meat (8x) outranks produce (5x) outranks pantry staples (1x)
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].title, "Chicken Skillet");
        assert_eq!(recs[1].title, "Spinach Salad");
        assert_eq!(recs[2].title, "Rice Bowl");

        let top_one = recommend(
            &book,
            &snapshot,
            &scorer,
            &RecommendOptions {
                limit: 1,
                ..Default::default()
            },
            now,
        );
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].recipe_id(), 2);
    }

    #[test]
    fn test_max_missing_filter() {
        let (catalog, weights) = setup();
        let scorer = WasteScorer::new(&catalog, &weights);
        let now = Utc::now();

        // Chicken is stocked; spinach and rice are not.
        let book = RecipeBook::new(vec![recipe(
            1,
            "Everything Bowl",
            "Dinner",
            &[(Some(1), 2.0), (Some(2), 2.0), (Some(3), 2.0)],
        )]);
        let snapshot = vec![item(1, 5.0, 24, now)];

        let strict = RecommendOptions {
            max_missing: 1,
            ..Default::default()
        };
        assert!(recommend(&book, &snapshot, &scorer, &strict, now).is_empty());

        let lenient = RecommendOptions {
            max_missing: 2,
            ..Default::default()
        };
        let recs = recommend(&book, &snapshot, &scorer, &lenient, now);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].result.missing_count, 2);
    }

    #[test]
    fn test_unmatched_recipes_are_dropped() {
        let (catalog, weights) = setup();
        let scorer = WasteScorer::new(&catalog, &weights);
        let now = Utc::now();

        let book = RecipeBook::new(vec![
            // Only external ingredients: nothing to match
            recipe(1, "Seasoning Mix", "Pantry", &[(None, 1.0)]),
            // Matched product but zero stock
            recipe(2, "Spinach Salad", "Lunch", &[(Some(2), 2.0)]),
        ]);
        let snapshot = vec![item(1, 5.0, 24, now)];

        let recs = recommend(
            &book,
            &snapshot,
            &scorer,
            &RecommendOptions {
                max_missing: 5,
                ..Default::default()
            },
            now,
        );
        assert!(recs.is_empty());
    }

    #[test]
    fn test_category_filter_substring() {
        let (catalog, weights) = setup();
        let scorer = WasteScorer::new(&catalog, &weights);
        let now = Utc::now();

        let book = RecipeBook::new(vec![
            recipe(1, "Chicken Skillet", "Quick Dinners", &[(Some(1), 2.0)]),
            recipe(2, "Spinach Salad", "Salads & Lunch", &[(Some(2), 2.0)]),
        ]);
        let snapshot = vec![item(1, 5.0, 24, now), item(2, 5.0, 24, now)];

        let options = RecommendOptions {
            category_filter: Some("DINNER".to_string()),
            ..Default::default()
        };
        let recs = recommend(&book, &snapshot, &scorer, &options, now);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "Chicken Skillet");
    }

    #[test]
    fn test_equal_scores_keep_book_order() {
        let (catalog, weights) = setup();
        let scorer = WasteScorer::new(&catalog, &weights);
        let now = Utc::now();

        // Identical requirements against the same lot score identically.
        let book = RecipeBook::new(vec![
            recipe(7, "First In Book", "Dinner", &[(Some(1), 2.0)]),
            recipe(3, "Second In Book", "Dinner", &[(Some(1), 2.0)]),
        ]);
        let snapshot = vec![item(1, 10.0, 24, now)];

        let recs = recommend(&book, &snapshot, &scorer, &RecommendOptions::default(), now);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].recipe_id(), 7);
        assert_eq!(recs[1].recipe_id(), 3);
    }

    #[test]
    fn test_empty_snapshot_recommends_nothing() {
        let (catalog, weights) = setup();
        let scorer = WasteScorer::new(&catalog, &weights);
        let now = Utc::now();

        let book = RecipeBook::new(vec![recipe(1, "Chicken Skillet", "Dinner", &[(Some(1), 2.0)])]);
        let recs = recommend(&book, &[], &scorer, &RecommendOptions::default(), now);
        assert!(recs.is_empty());
    }
}
