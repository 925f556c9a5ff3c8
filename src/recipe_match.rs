//! # Recipe Matching Module
//!
//! Scores one recipe against a pantry snapshot (real or projected).
//! Every matched ingredient walks the product's snapshot lots FEFO and
//! accumulates `per_unit_score * quantity_used`. Availability problems
//! never fail the call; they land in the counters:
//!
//! - `external_count`: ingredient has no catalog product, untracked
//! - `missing_count`: no stock at all, or stock ran out mid-walk
//! - `matched_count`: at least one lot of the product was available
//!
//! An ingredient with partial stock raises both `matched_count` and
//! `missing_count`. The recommender's filters rely on that: the recipe
//! stays rankable for using up what is there, while still flagging the
//! gap against `max_missing`.

use chrono::{DateTime, Utc};
use log::debug;

use crate::model::SnapshotItem;
use crate::recipe::Recipe;
use crate::waste_score::WasteScorer;

/// Aggregate result of matching one recipe against a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeScore {
    /// Recipe that was scored
    pub recipe_id: i64,

    /// Sum of per-lot contributions (`per_unit_score * used`)
    pub score: f64,

    /// Ingredients with at least one available lot
    pub matched_count: usize,

    /// Ingredients with no stock, or with stock short of the requirement
    pub missing_count: usize,

    /// Ingredients not tracked against the catalog
    pub external_count: usize,
}

impl RecipeScore {
    /// Check whether the recipe draws on any current stock
    pub fn uses_pantry(&self) -> bool {
        self.matched_count > 0 && self.score > 0.0
    }
}

/// Score a recipe against a snapshot at the given instant.
///
/// The snapshot may arrive in any order; the walk sorts each product's
/// items soonest-expiration first before drawing. Expired items are
/// skipped entirely, so stock that only exists as expired lots counts
/// as missing.
pub fn score_recipe(
    recipe: &Recipe,
    snapshot: &[SnapshotItem],
    scorer: &WasteScorer,
    now: DateTime<Utc>,
) -> RecipeScore {
    let mut score = 0.0;
    let mut matched_count = 0;
    let mut missing_count = 0;
    let mut external_count = 0;

    for ingredient in &recipe.ingredients {
        let product_id = match ingredient.matched_product_id {
            Some(id) => id,
            None => {
                external_count += 1;
                continue;
            }
        };

        let mut items: Vec<&SnapshotItem> = snapshot
            .iter()
            .filter(|item| item.product_id == product_id)
            .filter(|item| item.hours_remaining(now) > 0.0)
            .collect();
        if items.is_empty() {
            missing_count += 1;
            continue;
        }
        matched_count += 1;
        items.sort_by(|a, b| a.expiration.cmp(&b.expiration));

        let mut required_remaining = ingredient.quantity;
        for item in items {
            if required_remaining <= 0.0 {
                break;
            }
            let used = required_remaining.min(item.quantity);
            score += scorer.score(item, now) * used;
            required_remaining -= used;
        }
        if required_remaining > 0.0 {
            missing_count += 1;
        }
    }

    debug!(
        "Recipe {} '{}': score {:.4}, matched {}, missing {}, external {}",
        recipe.id, recipe.title, score, matched_count, missing_count, external_count
    );
    RecipeScore {
        recipe_id: recipe.id,
        score,
        matched_count,
        missing_count,
        external_count,
    }
}
