//! # Virtual Pantry Projector Module
//!
//! Projects what the pantry will look like after the queued-but-unconfirmed
//! meal plans are cooked. The projection is a pure computation over a
//! snapshot clone: no lots change, no events are written, and the result
//! is thrown away and recomputed whenever the queue changes rather than
//! patched in place.
//!
//! Feeding the projection back into the recommender keeps it from
//! recommending stock that an earlier queued meal will already use up.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::model::{PlannedEntry, SnapshotItem};
use crate::recipe::RecipeBook;

const QUANTITY_EPSILON: f64 = 1e-9;

/// Project a snapshot forward through the still-planned queue.
///
/// Entries apply in planned-date order (undated entries last, then
/// creation order); each one draws its recipe's matched ingredients
/// FEFO from the clone, exactly as real consumption would. Confirmed
/// and missed entries are ignored. Items drained to zero drop out of
/// the result.
pub fn project(
    real_snapshot: &[SnapshotItem],
    queue: &[PlannedEntry],
    recipes: &RecipeBook,
    now: DateTime<Utc>,
) -> Vec<SnapshotItem> {
    let mut items: Vec<SnapshotItem> = real_snapshot
        .iter()
        .filter(|item| item.hours_remaining(now) > 0.0)
        .cloned()
        .collect();

    let mut pending: Vec<&PlannedEntry> = queue.iter().filter(|e| e.is_active()).collect();
    pending.sort_by(|a, b| match (a.planned_for, b.planned_for) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    for entry in pending {
        let recipe = match recipes.get(entry.recipe_id) {
            Ok(recipe) => recipe,
            Err(_) => {
                warn!(
                    "Projection skipping entry {}: unknown recipe {}",
                    entry.sel_id, entry.recipe_id
                );
                continue;
            }
        };
        for ingredient in recipe.matched_ingredients() {
            let product_id = match ingredient.matched_product_id {
                Some(id) => id,
                None => continue,
            };

            let mut indices: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.product_id == product_id)
                .map(|(idx, _)| idx)
                .collect();
            indices.sort_by(|&a, &b| items[a].expiration.cmp(&items[b].expiration));

            let mut needed = ingredient.quantity;
            for idx in indices {
                if needed <= QUANTITY_EPSILON {
                    break;
                }
                let used = needed.min(items[idx].quantity);
                items[idx].quantity -= used;
                needed -= used;
            }
        }
    }

    items.retain(|item| item.quantity > QUANTITY_EPSILON);
    debug!(
        "Projected {} real items down to {} after {} queued plans",
        real_snapshot.len(),
        items.len(),
        queue.iter().filter(|e| e.is_active()).count()
    );
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MealSlot, PlanStatus};
    use crate::recipe::{Recipe, RequiredIngredient};
    use chrono::{Duration, NaiveDate};

    fn item(product_id: i64, quantity: f64, hours: i64, now: DateTime<Utc>) -> SnapshotItem {
        SnapshotItem {
            product_id,
            quantity,
            expiration: now + Duration::hours(hours),
        }
    }

    fn recipe(id: i64, needs: &[(i64, f64)]) -> Recipe {
        Recipe {
            id,
            title: format!("Recipe {id}"),
            category: "Dinner".to_string(),
            url: None,
            image_url: None,
            serves: None,
            time: None,
            ingredients: needs
                .iter()
                .map(|&(pid, qty)| RequiredIngredient {
                    name: format!("product {pid}"),
                    raw_text: None,
                    matched_product_id: Some(pid),
                    quantity: qty,
                    unit: "oz".to_string(),
                })
                .collect(),
            slots: Vec::new(),
        }
    }

    fn entry(sel_id: i64, recipe_id: i64, day: Option<u32>, status: PlanStatus) -> PlannedEntry {
        PlannedEntry {
            sel_id,
            recipe_id,
            planned_for: day.map(|d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap()),
            slot: MealSlot::Dinner,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_projection_leaves_input_untouched() {
        let now = Utc::now();
        let book = RecipeBook::new(vec![recipe(1, &[(10, 4.0)])]);
        let real = vec![item(10, 4.0, 48, now)];
        let queue = vec![entry(1, 1, Some(10), PlanStatus::Planned)];

        let virtual_snapshot = project(&real, &queue, &book, now);
        assert!(virtual_snapshot.is_empty());
        // The real snapshot is untouched
        assert_eq!(real[0].quantity, 4.0);
    }

    #[test]
    fn test_entries_apply_in_date_order() {
        let now = Utc::now();
        // Two dinners both want product 10; only 5 units exist.
        let book = RecipeBook::new(vec![recipe(1, &[(10, 3.0)]), recipe(2, &[(10, 3.0)])]);
        let real = vec![item(10, 5.0, 72, now)];

        // Later-dated entry listed first; date order must still win.
        let queue = vec![
            entry(1, 2, Some(20), PlanStatus::Planned),
            entry(2, 1, Some(12), PlanStatus::Planned),
        ];
        let projected = project(&real, &queue, &book, now);

        // 5 - 3 - min(3, 2) leaves nothing
        assert!(projected.is_empty());
    }

    #[test]
    fn test_confirmed_and_missed_entries_are_ignored() {
        let now = Utc::now();
        let book = RecipeBook::new(vec![recipe(1, &[(10, 4.0)])]);
        let real = vec![item(10, 4.0, 48, now)];

        let queue = vec![
            entry(1, 1, Some(10), PlanStatus::Confirmed),
            entry(2, 1, Some(11), PlanStatus::Missed),
        ];
        let projected = project(&real, &queue, &book, now);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].quantity, 4.0);
    }

    #[test]
    fn test_draws_fefo_within_a_product() {
        let now = Utc::now();
        let book = RecipeBook::new(vec![recipe(1, &[(10, 3.0)])]);
        // Later-expiring item listed first
        let real = vec![item(10, 10.0, 120, now), item(10, 2.0, 24, now)];
        let queue = vec![entry(1, 1, Some(10), PlanStatus::Planned)];

        let projected = project(&real, &queue, &book, now);
        assert_eq!(projected.len(), 1);
        // The 24h item drained fully; the 120h one lost the remainder
        assert!((projected[0].quantity - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_expired_items_never_enter_projection() {
        let now = Utc::now();
        let book = RecipeBook::new(vec![recipe(1, &[(10, 1.0)])]);
        let real = vec![item(10, 5.0, -2, now), item(10, 5.0, 48, now)];

        let projected = project(&real, &[], &book, now);
        assert_eq!(projected.len(), 1);
        assert!((projected[0].quantity - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_recipe_is_skipped() {
        let now = Utc::now();
        let book = RecipeBook::new(vec![recipe(1, &[(10, 2.0)])]);
        let real = vec![item(10, 5.0, 48, now)];
        let queue = vec![
            entry(1, 999, Some(10), PlanStatus::Planned),
            entry(2, 1, Some(11), PlanStatus::Planned),
        ];

        let projected = project(&real, &queue, &book, now);
        assert_eq!(projected.len(), 1);
        assert!((projected[0].quantity - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let now = Utc::now();
        let book = RecipeBook::new(vec![recipe(1, &[(10, 2.0)]), recipe(2, &[(11, 1.0)])]);
        let real = vec![item(10, 5.0, 48, now), item(11, 3.0, 24, now)];
        let queue = vec![
            entry(1, 1, Some(10), PlanStatus::Planned),
            entry(2, 2, None, PlanStatus::Planned),
        ];

        let first = project(&real, &queue, &book, now);
        let second = project(&real, &queue, &book, now);
        assert_eq!(first, second);
    }
}
