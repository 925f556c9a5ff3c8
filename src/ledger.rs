//! # Pantry Ledger Module
//!
//! The authoritative list of physical inventory lots and the only writer
//! of the append-only event log. All mutations run inside one SQLite
//! transaction per public call, so a failed operation leaves nothing
//! half-written.
//!
//! Consumption is FEFO: lots of a product are drawn soonest-expiration
//! first. Quantity shortfalls do not fail a consume call; they come back
//! as data in the [`ConsumeReport`] so callers can rank or audit them.

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use rusqlite::Connection;

use crate::catalog::Catalog;
use crate::db;
use crate::error::{PantryError, PantryResult};
use crate::model::{EventKind, Lot, LotView, PantryEvent, SnapshotItem};
use crate::recipe::RecipeBook;

/// Consuming a lot expiring within this many days also logs an `avoid`
/// event: the meal prevented near-term waste.
pub const AVOID_WINDOW_DAYS: i64 = 2;

// Residue below this is treated as an emptied lot
const QUANTITY_EPSILON: f64 = 1e-9;

/// Outcome of drawing one recipe ingredient from the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientConsumption {
    /// Matched catalog product
    pub product_id: i64,

    /// Ingredient name as written in the recipe
    pub name: String,

    /// Quantity the recipe required
    pub requested: f64,

    /// Quantity actually drawn across all lots
    pub consumed: f64,

    /// Unit label of the requirement
    pub unit: String,
}

impl IngredientConsumption {
    /// Required quantity that could not be drawn
    pub fn shortfall(&self) -> f64 {
        (self.requested - self.consumed).max(0.0)
    }
}

/// Per-ingredient record of a `consume_for_recipe` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumeReport {
    /// One record per matched ingredient, in recipe order
    pub entries: Vec<IngredientConsumption>,
}

impl ConsumeReport {
    /// Check whether every matched ingredient was fully drawn
    pub fn fully_satisfied(&self) -> bool {
        self.entries.iter().all(|e| e.shortfall() <= QUANTITY_EPSILON)
    }

    /// Records left short of their requirement
    pub fn shortfalls(&self) -> Vec<&IngredientConsumption> {
        self.entries
            .iter()
            .filter(|e| e.shortfall() > QUANTITY_EPSILON)
            .collect()
    }

    /// Total quantity drawn across all ingredients
    pub fn total_consumed(&self) -> f64 {
        self.entries.iter().map(|e| e.consumed).sum()
    }
}

/// Service over the pantry's lot list and event log
pub struct PantryLedger<'a> {
    conn: &'a Connection,
    catalog: &'a Catalog,
    recipes: &'a RecipeBook,
}

impl<'a> PantryLedger<'a> {
    /// Create a ledger over an open connection and session reference data
    pub fn new(conn: &'a Connection, catalog: &'a Catalog, recipes: &'a RecipeBook) -> Self {
        Self {
            conn,
            catalog,
            recipes,
        }
    }

    /// Add a new lot of a product.
    ///
    /// Expiration is `purchase_date + shelf life`; `purchase_date` defaults
    /// to now. Fails with `NotFound` when the product is not in the catalog.
    pub fn add(
        &self,
        product_id: i64,
        quantity: f64,
        unit: &str,
        purchase_date: Option<DateTime<Utc>>,
    ) -> PantryResult<Lot> {
        let product = self.catalog.get_product(product_id)?;
        let date_added = purchase_date.unwrap_or_else(Utc::now);
        let expiration = date_added + Duration::days(product.effective_shelf_life_days());

        let tx = self.conn.unchecked_transaction()?;
        let lot_id = db::insert_lot(&tx, product_id, quantity, unit, date_added, expiration)?;
        tx.commit()?;

        Ok(Lot {
            id: lot_id,
            product_id,
            quantity,
            unit: unit.to_string(),
            date_added,
            expiration,
        })
    }

    /// Delete a lot outright, regardless of remaining quantity.
    ///
    /// Planned entries whose recipe depends on the lot's product are
    /// removed as well; their stock basis is gone.
    pub fn remove(&self, lot_id: i64) -> PantryResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let lot = db::read_lot(&tx, lot_id)?
            .ok_or_else(|| PantryError::NotFound(format!("lot {lot_id}")))?;

        self.remove_dependent_plans(&tx, lot.product_id)?;
        db::delete_lot(&tx, lot_id)?;
        tx.commit()?;

        info!("Removed lot {lot_id} (product {})", lot.product_id);
        Ok(())
    }

    /// Discard a lot, logging a `trash` event for its full remaining
    /// quantity and invalidating dependent planned entries.
    pub fn trash(&self, lot_id: i64) -> PantryResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let lot = db::read_lot(&tx, lot_id)?
            .ok_or_else(|| PantryError::NotFound(format!("lot {lot_id}")))?;

        self.trash_lot_inner(&tx, &lot, None)?;
        self.remove_dependent_plans(&tx, lot.product_id)?;
        tx.commit()?;
        Ok(())
    }

    /// Discard every lot, or only those whose product category contains
    /// the given text (case-insensitive). Returns the number trashed.
    pub fn trash_by_category(&self, category: Option<&str>) -> PantryResult<usize> {
        let needle = category.map(|c| c.to_lowercase());
        let tx = self.conn.unchecked_transaction()?;

        let mut trashed = 0usize;
        let mut product_ids: Vec<i64> = Vec::new();
        for lot in db::all_lots(&tx)? {
            if let Some(needle) = &needle {
                let matches = match self.catalog.get_product(lot.product_id) {
                    Ok(product) => product.category.to_lowercase().contains(needle.as_str()),
                    Err(_) => false,
                };
                if !matches {
                    continue;
                }
            }
            self.trash_lot_inner(&tx, &lot, None)?;
            if !product_ids.contains(&lot.product_id) {
                product_ids.push(lot.product_id);
            }
            trashed += 1;
        }

        for product_id in product_ids {
            self.remove_dependent_plans(&tx, product_id)?;
        }
        tx.commit()?;

        info!("Trashed {trashed} lots (category filter: {category:?})");
        Ok(trashed)
    }

    /// Discard every lot whose expiration has passed; returns the count.
    ///
    /// Expired stock only ever leaves the pantry through this sweep; the
    /// scorer and snapshot never see it.
    pub fn trash_expired(&self) -> PantryResult<usize> {
        let now = Utc::now();
        let tx = self.conn.unchecked_transaction()?;

        let expired = db::lots_expiring_before(&tx, now)?;
        let count = expired.len();
        for lot in &expired {
            self.trash_lot_inner(&tx, lot, None)?;
        }
        tx.commit()?;

        if count > 0 {
            info!("Trashed {count} expired lots");
        }
        Ok(count)
    }

    /// Draw a recipe's matched ingredients from the pantry, FEFO.
    ///
    /// Each touched lot gets a `consume` event for the quantity drawn,
    /// plus an `avoid` event when the lot was within
    /// [`AVOID_WINDOW_DAYS`] of expiring. Lots drawn to zero are deleted.
    /// Shortfall never fails the call; it is reported per ingredient.
    pub fn consume_for_recipe(
        &self,
        recipe_id: i64,
        planned_entry_id: Option<i64>,
    ) -> PantryResult<ConsumeReport> {
        let tx = self.conn.unchecked_transaction()?;
        let report = self.consume_recipe_tx(&tx, recipe_id, planned_entry_id, Utc::now())?;
        tx.commit()?;

        info!(
            "Consumed {:.2} units across {} ingredients for recipe {recipe_id}",
            report.total_consumed(),
            report.entries.len()
        );
        Ok(report)
    }

    /// FEFO draw-down running inside a transaction the caller owns.
    ///
    /// The scheduler wraps auto-purchase, consumption and the status
    /// change of a confirmed plan in one transaction through this.
    pub(crate) fn consume_recipe_tx(
        &self,
        conn: &Connection,
        recipe_id: i64,
        planned_entry_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> PantryResult<ConsumeReport> {
        let recipe = self.recipes.get(recipe_id)?;
        let mut report = ConsumeReport::default();

        for ingredient in &recipe.ingredients {
            let product_id = match ingredient.matched_product_id {
                Some(id) => id,
                None => continue,
            };

            let mut needed = ingredient.quantity;
            let mut consumed = 0.0;
            for lot in db::lots_for_product(conn, product_id)? {
                if needed <= QUANTITY_EPSILON {
                    break;
                }
                let used = needed.min(lot.quantity);
                if used <= 0.0 {
                    continue;
                }

                if lot.expires_within(now, AVOID_WINDOW_DAYS) {
                    db::insert_event(
                        conn,
                        Some(lot.id),
                        EventKind::Avoid,
                        used,
                        &lot.unit,
                        now,
                        planned_entry_id,
                    )?;
                }
                db::insert_event(
                    conn,
                    Some(lot.id),
                    EventKind::Consume,
                    used,
                    &lot.unit,
                    now,
                    planned_entry_id,
                )?;

                let remaining = lot.quantity - used;
                if remaining > QUANTITY_EPSILON {
                    db::update_lot_quantity(conn, lot.id, remaining)?;
                } else {
                    db::delete_lot(conn, lot.id)?;
                }

                needed -= used;
                consumed += used;
            }

            if needed > QUANTITY_EPSILON {
                warn!(
                    "Recipe {recipe_id}: ingredient '{}' short by {needed} {}",
                    ingredient.name, ingredient.unit
                );
            }
            report.entries.push(IngredientConsumption {
                product_id,
                name: ingredient.name.clone(),
                requested: ingredient.quantity,
                consumed,
                unit: ingredient.unit.clone(),
            });
        }
        Ok(report)
    }

    /// Lots joined with product name and category, soonest expiration
    /// first, optionally filtered by category substring.
    pub fn list_lots(&self, filter_category: Option<&str>) -> PantryResult<Vec<LotView>> {
        let needle = filter_category.map(|c| c.to_lowercase());
        let mut views = Vec::new();
        for lot in db::all_lots(self.conn)? {
            let view = self.lot_view(lot);
            if let Some(needle) = &needle {
                if !view.category.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
            }
            views.push(view);
        }
        Ok(views)
    }

    /// Non-expired lots closest to expiring, at most `limit` of them
    pub fn expiring_soonest(&self, limit: usize) -> PantryResult<Vec<LotView>> {
        let now = Utc::now();
        let views = db::all_lots(self.conn)?
            .into_iter()
            .filter(|lot| !lot.is_expired(now))
            .take(limit)
            .map(|lot| self.lot_view(lot))
            .collect();
        Ok(views)
    }

    /// Flattened export of all non-expired lots for scoring and projection
    pub fn snapshot(&self) -> PantryResult<Vec<SnapshotItem>> {
        let now = Utc::now();
        let items = db::all_lots(self.conn)?
            .into_iter()
            .filter(|lot| !lot.is_expired(now))
            .map(|lot| SnapshotItem {
                product_id: lot.product_id,
                quantity: lot.quantity,
                expiration: lot.expiration,
            })
            .collect();
        Ok(items)
    }

    /// The event log in append order, optionally filtered by kind
    pub fn events(&self, kind: Option<EventKind>) -> PantryResult<Vec<PantryEvent>> {
        Ok(db::list_events(self.conn, kind)?)
    }

    /// Wipe lots, planned entries and events
    pub fn clear(&self) -> PantryResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        db::clear_all(&tx)?;
        tx.commit()?;
        Ok(())
    }

    fn lot_view(&self, lot: Lot) -> LotView {
        match self.catalog.get_product(lot.product_id) {
            Ok(product) => LotView {
                product_name: product.name.clone(),
                category: product.category.clone(),
                lot,
            },
            Err(_) => {
                warn!("Lot {} references unknown product {}", lot.id, lot.product_id);
                LotView {
                    product_name: format!("product {}", lot.product_id),
                    category: "other".to_string(),
                    lot,
                }
            }
        }
    }

    fn trash_lot_inner(
        &self,
        conn: &Connection,
        lot: &Lot,
        planned_entry_id: Option<i64>,
    ) -> PantryResult<()> {
        db::insert_event(
            conn,
            Some(lot.id),
            EventKind::Trash,
            lot.quantity,
            &lot.unit,
            Utc::now(),
            planned_entry_id,
        )?;
        db::delete_lot(conn, lot.id)?;
        info!("Trashed lot {} ({} {} of product {})", lot.id, lot.quantity, lot.unit, lot.product_id);
        Ok(())
    }

    /// Drop still-planned entries whose recipe requires the given product
    fn remove_dependent_plans(&self, conn: &Connection, product_id: i64) -> PantryResult<usize> {
        let mut removed = 0usize;
        for entry in db::active_planned_entries(conn)? {
            let recipe = match self.recipes.get(entry.recipe_id) {
                Ok(recipe) => recipe,
                Err(_) => {
                    warn!(
                        "Planned entry {} references unknown recipe {}",
                        entry.sel_id, entry.recipe_id
                    );
                    continue;
                }
            };
            let depends = recipe
                .matched_ingredients()
                .any(|ing| ing.matched_product_id == Some(product_id));
            if depends && db::delete_planned_entry(conn, entry.sel_id)? {
                info!(
                    "Dropped planned entry {} (recipe {}): product {product_id} left the pantry",
                    entry.sel_id, entry.recipe_id
                );
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::model::{MealSlot, PlanStatus};
    use crate::recipe::{Recipe, RecipeBook, RequiredIngredient};
    use anyhow::Result;
    use tempfile::NamedTempFile;

    fn test_catalog() -> Catalog {
        Catalog::new(vec![
            Product {
                id: 1,
                name: "Chicken Thighs".to_string(),
                norm_name: None,
                unit: "oz".to_string(),
                package_quantity: 16.0,
                price: Some(6.99),
                url: None,
                category: "Meat, Seafood & Plant-based".to_string(),
                sub_category: None,
                shelf_life_days: Some(3),
            },
            Product {
                id: 2,
                name: "Baby Spinach".to_string(),
                norm_name: None,
                unit: "oz".to_string(),
                package_quantity: 6.0,
                price: Some(2.49),
                url: None,
                category: "Fresh Fruits & Veggies".to_string(),
                sub_category: None,
                shelf_life_days: Some(5),
            },
            Product {
                id: 3,
                name: "Arborio Rice".to_string(),
                norm_name: None,
                unit: "oz".to_string(),
                package_quantity: 17.6,
                price: Some(3.99),
                url: None,
                category: "For the Pantry".to_string(),
                sub_category: None,
                shelf_life_days: Some(365),
            },
        ])
    }

    fn test_recipes() -> RecipeBook {
        RecipeBook::new(vec![Recipe {
            id: 10,
            title: "Chicken and Rice".to_string(),
            category: "Dinner".to_string(),
            url: None,
            image_url: None,
            serves: Some(2),
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
                    name: "rice".to_string(),
                    raw_text: None,
                    matched_product_id: Some(3),
                    quantity: 8.0,
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
        }])
    }

    fn setup() -> Result<(Connection, NamedTempFile)> {
        let temp_file = NamedTempFile::new()?;
        let conn = Connection::open(temp_file.path())?;
        db::init_database_schema(&conn)?;
        Ok((conn, temp_file))
    }

    #[test]
    fn test_add_uses_shelf_life_for_expiration() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);

        let purchased = Utc::now();
        let lot = ledger.add(1, 16.0, "oz", Some(purchased)).unwrap();
        assert_eq!(lot.expiration, purchased + Duration::days(3));
        assert_eq!(lot.quantity, 16.0);

        let err = ledger.add(999, 1.0, "oz", None);
        assert!(matches!(err, Err(PantryError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_consume_walks_lots_fefo() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);
        let now = Utc::now();

        // Two chicken lots: day 1 holds 2 oz, day 5 holds 10 oz. Recipe
        // needs 3 oz: day-1 lot drains and is deleted, day-5 lot drops to 9.
        let early = ledger.add(1, 2.0, "oz", Some(now - Duration::days(2)))?;
        let late = ledger.add(1, 10.0, "oz", Some(now + Duration::days(2)))?;
        ledger.add(3, 8.0, "oz", Some(now))?;

        let report = ledger.consume_for_recipe(10, None).unwrap();
        assert!(report.fully_satisfied());

        assert!(db::read_lot(&conn, early.id)?.is_none());
        let late_lot = db::read_lot(&conn, late.id)?.unwrap();
        assert!((late_lot.quantity - 9.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_consume_conservation_against_events() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);
        let now = Utc::now();

        ledger.add(1, 2.0, "oz", Some(now - Duration::days(1)))?;
        ledger.add(1, 10.0, "oz", Some(now))?;
        ledger.add(3, 20.0, "oz", Some(now))?;
        let total_before: f64 = ledger.snapshot().unwrap().iter().map(|i| i.quantity).sum();

        let report = ledger.consume_for_recipe(10, None).unwrap();
        let total_after: f64 = ledger.snapshot().unwrap().iter().map(|i| i.quantity).sum();

        let consumed_events: f64 = ledger
            .events(Some(EventKind::Consume))
            .unwrap()
            .iter()
            .map(|e| e.amount)
            .sum();
        // Quantity leaving the lots equals the consume-event total
        assert!((total_before - total_after - consumed_events).abs() < 1e-9);
        assert!((report.total_consumed() - consumed_events).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_consume_shortfall_reported_not_raised() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);

        // Recipe wants 3 oz chicken and 8 oz rice; only 1 oz chicken exists
        ledger.add(1, 1.0, "oz", None)?;

        let report = ledger.consume_for_recipe(10, None).unwrap();
        assert!(!report.fully_satisfied());
        let shortfalls = report.shortfalls();
        assert_eq!(shortfalls.len(), 2);
        let chicken = &report.entries[0];
        assert_eq!(chicken.product_id, 1);
        assert!((chicken.consumed - 1.0).abs() < 1e-9);
        assert!((chicken.shortfall() - 2.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_consume_near_expiry_logs_avoid() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);
        let now = Utc::now();

        // Chicken shelf life is 3 days; buying 2 days ago leaves 1 day,
        // inside the avoid window. Rice expires far out.
        ledger.add(1, 5.0, "oz", Some(now - Duration::days(2)))?;
        ledger.add(3, 20.0, "oz", Some(now))?;

        ledger.consume_for_recipe(10, None).unwrap();

        let avoids = ledger.events(Some(EventKind::Avoid)).unwrap();
        assert_eq!(avoids.len(), 1);
        assert!((avoids[0].amount - 3.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_trash_logs_full_quantity_and_cascades() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);

        let lot = ledger.add(1, 5.0, "oz", None)?;
        let sel_id = db::insert_planned_entry(
            &conn,
            10,
            None,
            MealSlot::Dinner,
            PlanStatus::Planned,
            Utc::now(),
        )?;

        ledger.trash(lot.id).unwrap();

        let trash_events = ledger.events(Some(EventKind::Trash)).unwrap();
        assert_eq!(trash_events.len(), 1);
        assert!((trash_events[0].amount - 5.0).abs() < 1e-9);
        // The planned chicken dinner lost its stock basis
        assert!(db::read_planned_entry(&conn, sel_id)?.is_none());
        Ok(())
    }

    #[test]
    fn test_trash_keeps_confirmed_entries() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);

        let lot = ledger.add(1, 5.0, "oz", None)?;
        let sel_id = db::insert_planned_entry(
            &conn,
            10,
            None,
            MealSlot::Dinner,
            PlanStatus::Confirmed,
            Utc::now(),
        )?;

        ledger.trash(lot.id).unwrap();
        // History survives; only still-planned entries cascade
        assert!(db::read_planned_entry(&conn, sel_id)?.is_some());
        Ok(())
    }

    #[test]
    fn test_trash_by_category_filters() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);

        ledger.add(1, 5.0, "oz", None)?;
        ledger.add(2, 6.0, "oz", None)?;
        ledger.add(3, 17.6, "oz", None)?;

        let trashed = ledger.trash_by_category(Some("veggies")).unwrap();
        assert_eq!(trashed, 1);
        assert_eq!(ledger.list_lots(None).unwrap().len(), 2);

        let all = ledger.trash_by_category(None).unwrap();
        assert_eq!(all, 2);
        assert!(ledger.list_lots(None).unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_trash_expired_sweep() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);
        let now = Utc::now();

        // Shelf life 3 days, bought 5 days ago: expired 2 days ago
        ledger.add(1, 4.0, "oz", Some(now - Duration::days(5)))?;
        ledger.add(2, 6.0, "oz", Some(now))?;

        assert_eq!(ledger.trash_expired().unwrap(), 1);
        assert_eq!(ledger.trash_expired().unwrap(), 0);
        assert_eq!(ledger.list_lots(None).unwrap().len(), 1);
        Ok(())
    }

    #[test]
    fn test_snapshot_excludes_expired_and_is_idempotent() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);
        let now = Utc::now();

        ledger.add(1, 4.0, "oz", Some(now - Duration::days(5)))?;
        ledger.add(2, 6.0, "oz", Some(now))?;

        let first = ledger.snapshot().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].product_id, 2);

        let second = ledger.snapshot().unwrap();
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_list_lots_joins_and_filters() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);

        ledger.add(1, 5.0, "oz", None)?;
        ledger.add(3, 17.6, "oz", None)?;

        let views = ledger.list_lots(None).unwrap();
        assert_eq!(views.len(), 2);
        assert!(views.iter().any(|v| v.product_name == "Chicken Thighs"));

        let pantry_only = ledger.list_lots(Some("pantry")).unwrap();
        assert_eq!(pantry_only.len(), 1);
        assert_eq!(pantry_only[0].product_name, "Arborio Rice");
        Ok(())
    }

    #[test]
    fn test_expiring_soonest_order_and_limit() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);
        let now = Utc::now();

        ledger.add(3, 17.6, "oz", Some(now))?;
        ledger.add(1, 5.0, "oz", Some(now))?;
        ledger.add(2, 6.0, "oz", Some(now))?;

        let soonest = ledger.expiring_soonest(2).unwrap();
        assert_eq!(soonest.len(), 2);
        // Chicken (3 days) before spinach (5 days)
        assert_eq!(soonest[0].product_name, "Chicken Thighs");
        assert_eq!(soonest[1].product_name, "Baby Spinach");
        Ok(())
    }

    #[test]
    fn test_remove_unknown_lot() -> Result<()> {
        let (conn, _tmp) = setup()?;
        let catalog = test_catalog();
        let recipes = test_recipes();
        let ledger = PantryLedger::new(&conn, &catalog, &recipes);

        assert!(matches!(
            ledger.remove(12345),
            Err(PantryError::NotFound(_))
        ));
        Ok(())
    }
}
