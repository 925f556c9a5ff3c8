//! # Grocery List Module
//!
//! Turns requirement shortfalls into a purchasable list. Quantities are
//! rounded up to whole store packages, so a 5 oz gap against a 16 oz
//! package becomes one package. The scheduler reuses [`needed_for_recipe`]
//! on confirm to size its automatic purchases.

use log::{debug, warn};

use crate::catalog::Catalog;
use crate::error::{PantryError, PantryResult};
use crate::model::{PlannedEntry, SnapshotItem};
use crate::recipe::{Recipe, RecipeBook};

const QUANTITY_EPSILON: f64 = 1e-9;

/// One line of a grocery list
#[derive(Debug, Clone, PartialEq)]
pub struct GroceryItem {
    /// Catalog product to buy
    pub product_id: i64,

    /// Product display name
    pub name: String,

    /// Required quantity not covered by stock
    pub shortfall: f64,

    /// Pantry unit of the product
    pub unit: String,

    /// Whole packages covering the shortfall
    pub packages: u32,

    /// Quantity per package
    pub package_quantity: f64,

    /// Price per package, if the catalog knows it
    pub price: Option<f64>,
}

impl GroceryItem {
    /// Quantity actually purchased when buying whole packages
    pub fn purchased_quantity(&self) -> f64 {
        f64::from(self.packages) * self.package_quantity
    }

    /// Line cost, if the product is priced
    pub fn line_cost(&self) -> Option<f64> {
        self.price.map(|p| p * f64::from(self.packages))
    }
}

/// A grocery list, one line per product
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroceryList {
    /// Lines in catalog product-id order
    pub items: Vec<GroceryItem>,
}

impl GroceryList {
    /// Check whether anything needs buying
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products to buy
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of the known line costs; unpriced products contribute nothing
    pub fn estimated_total(&self) -> f64 {
        self.items.iter().filter_map(|i| i.line_cost()).sum()
    }
}

/// Whole packages needed to cover a shortfall
fn packages_for(shortfall: f64, package_quantity: f64) -> u32 {
    if shortfall <= QUANTITY_EPSILON {
        return 0;
    }
    let per_package = if package_quantity > 0.0 {
        package_quantity
    } else {
        1.0
    };
    (shortfall / per_package).ceil() as u32
}

/// Quantity of a product available in a snapshot
fn available(snapshot: &[SnapshotItem], product_id: i64) -> f64 {
    snapshot
        .iter()
        .filter(|item| item.product_id == product_id)
        .map(|item| item.quantity)
        .sum()
}

/// Build the buy list from per-product shortfalls.
///
/// Every shortfall product must exist in the catalog; products the store
/// no longer carries make the whole list fail with `ProductUnavailable`
/// naming the affected ingredients.
fn build_list(
    shortfalls: &[(i64, String, f64)],
    catalog: &Catalog,
) -> PantryResult<GroceryList> {
    let mut items = Vec::new();
    let mut unsourceable: Vec<String> = Vec::new();

    for (product_id, ingredient_name, shortfall) in shortfalls {
        if *shortfall <= QUANTITY_EPSILON {
            continue;
        }
        match catalog.get_product(*product_id) {
            Ok(product) => items.push(GroceryItem {
                product_id: *product_id,
                name: product.name.clone(),
                shortfall: *shortfall,
                unit: product.unit.clone(),
                packages: packages_for(*shortfall, product.package_quantity),
                package_quantity: product.package_quantity,
                price: product.price,
            }),
            Err(_) => unsourceable.push(ingredient_name.clone()),
        }
    }

    if !unsourceable.is_empty() {
        return Err(PantryError::ProductUnavailable(unsourceable.join(", ")));
    }
    items.sort_by_key(|item| item.product_id);
    Ok(GroceryList { items })
}

/// Grocery list covering one recipe against a snapshot.
///
/// The snapshot is expected to hold non-expired stock only, the way
/// `PantryLedger::snapshot` and `projector::project` produce it.
pub fn needed_for_recipe(
    recipe: &Recipe,
    snapshot: &[SnapshotItem],
    catalog: &Catalog,
) -> PantryResult<GroceryList> {
    let mut shortfalls: Vec<(i64, String, f64)> = Vec::new();
    for ingredient in recipe.matched_ingredients() {
        let product_id = match ingredient.matched_product_id {
            Some(id) => id,
            None => continue,
        };
        let gap = ingredient.quantity - available(snapshot, product_id);
        if gap > QUANTITY_EPSILON {
            shortfalls.push((product_id, ingredient.name.clone(), gap));
        }
    }
    debug!(
        "Recipe {} '{}' needs {} products bought",
        recipe.id,
        recipe.title,
        shortfalls.len()
    );
    build_list(&shortfalls, catalog)
}

/// Grocery list covering the whole still-planned queue.
///
/// Walks the queue in planned-date order, draining a snapshot clone the
/// way the projector does, and accumulates what each meal still lacks.
/// One line per product, shortfalls summed across meals.
pub fn grocery_list(
    queue: &[PlannedEntry],
    recipes: &RecipeBook,
    snapshot: &[SnapshotItem],
    catalog: &Catalog,
) -> PantryResult<GroceryList> {
    let mut items: Vec<SnapshotItem> = snapshot.to_vec();

    let mut pending: Vec<&PlannedEntry> = queue.iter().filter(|e| e.is_active()).collect();
    pending.sort_by(|a, b| match (a.planned_for, b.planned_for) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut shortfalls: Vec<(i64, String, f64)> = Vec::new();
    for entry in pending {
        let recipe = match recipes.get(entry.recipe_id) {
            Ok(recipe) => recipe,
            Err(_) => {
                warn!(
                    "Grocery list skipping entry {}: unknown recipe {}",
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

            if needed > QUANTITY_EPSILON {
                match shortfalls.iter_mut().find(|(pid, _, _)| *pid == product_id) {
                    Some((_, _, total)) => *total += needed,
                    None => shortfalls.push((product_id, ingredient.name.clone(), needed)),
                }
            }
        }
    }
    build_list(&shortfalls, catalog)
}
