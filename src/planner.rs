//! # Meal Planner Module
//!
//! The scheduling queue over the pantry. Each queued entry binds a
//! recipe to a (date, meal-slot) pair; two entries never share a pair.
//! Lifecycle per entry:
//!
//! - `planned -> confirmed`: the meal was cooked; stock is drawn from
//!   the real ledger, topped up first by an automatic purchase when
//!   short, all in one transaction
//! - `planned -> missed`: the planned date passed unconfirmed, via the
//!   cleanup sweep
//! - `planned -> deleted`: explicit removal; nothing was ever consumed
//!
//! Scheduling chases expirations: a new plan lands on the earliest free
//! allowed slot no later than the soonest expiry among the recipe's
//! stocked ingredients, computed against the virtual pantry so queued
//! meals don't double-book the same stock.

use chrono::{Duration, NaiveDate, Utc};
use log::{debug, info, warn};
use rusqlite::Connection;

use crate::catalog::Catalog;
use crate::db;
use crate::error::{PantryError, PantryResult};
use crate::grocery;
use crate::ledger::{ConsumeReport, PantryLedger};
use crate::model::{MealSlot, PlanStatus, PlannedEntry, SnapshotItem};
use crate::projector;
use crate::recipe::{Recipe, RecipeBook, FALLBACK_SLOTS};

/// Days scanned forward before settling for any free day at all
pub const SCHEDULING_HORIZON_DAYS: i64 = 14;

/// Target offset applied when a recipe has no stocked ingredients to chase
pub const DEFAULT_PLAN_OFFSET_DAYS: i64 = 10;

/// Find the best (date, slot) for a recipe against the current queue.
///
/// Scans day by day from `today`, trying the recipe's allowed slots in
/// order, and returns the first free pair dated no later than the
/// soonest expiry among the recipe's ingredients in `virtual_snapshot`
/// (or `today + 10` days when nothing is stocked). If nothing frees up
/// by then, the first free pair found anywhere wins, so a plan is
/// always produced.
pub fn compute_optimal_slot(
    recipe: &Recipe,
    virtual_snapshot: &[SnapshotItem],
    queue: &[PlannedEntry],
    today: NaiveDate,
) -> (NaiveDate, MealSlot) {
    let allowed: Vec<MealSlot> = if recipe.slots.is_empty() {
        FALLBACK_SLOTS.to_vec()
    } else {
        recipe.slots.clone()
    };

    let target = earliest_matched_expiry(recipe, virtual_snapshot)
        .unwrap_or(today + Duration::days(DEFAULT_PLAN_OFFSET_DAYS));
    debug!(
        "Scheduling recipe {} '{}': slots {:?}, target date {}",
        recipe.id, recipe.title, allowed, target
    );

    let mut first_free: Option<(NaiveDate, MealSlot)> = None;
    for offset in 0..=SCHEDULING_HORIZON_DAYS {
        let date = today + Duration::days(offset);
        for &slot in &allowed {
            if slot_taken(queue, date, slot) {
                continue;
            }
            if date <= target {
                return (date, slot);
            }
            if first_free.is_none() {
                first_free = Some((date, slot));
            }
        }
    }
    if let Some(found) = first_free {
        return found;
    }

    // Horizon fully booked; keep walking until a day frees up
    let mut offset = SCHEDULING_HORIZON_DAYS + 1;
    loop {
        let date = today + Duration::days(offset);
        for &slot in &allowed {
            if !slot_taken(queue, date, slot) {
                return (date, slot);
            }
        }
        offset += 1;
    }
}

fn slot_taken(queue: &[PlannedEntry], date: NaiveDate, slot: MealSlot) -> bool {
    queue
        .iter()
        .any(|e| e.is_active() && e.planned_for == Some(date) && e.slot == slot)
}

fn earliest_matched_expiry(recipe: &Recipe, snapshot: &[SnapshotItem]) -> Option<NaiveDate> {
    recipe
        .matched_ingredients()
        .filter_map(|ing| ing.matched_product_id)
        .flat_map(|pid| snapshot.iter().filter(move |item| item.product_id == pid))
        .map(|item| item.expiration.date_naive())
        .min()
}

/// Service over the scheduling queue
pub struct MealPlanner<'a> {
    conn: &'a Connection,
    catalog: &'a Catalog,
    recipes: &'a RecipeBook,
}

impl<'a> MealPlanner<'a> {
    /// Create a planner over an open connection and session reference data
    pub fn new(conn: &'a Connection, catalog: &'a Catalog, recipes: &'a RecipeBook) -> Self {
        Self {
            conn,
            catalog,
            recipes,
        }
    }

    fn ledger(&self) -> PantryLedger<'a> {
        PantryLedger::new(self.conn, self.catalog, self.recipes)
    }

    /// Queue a recipe on its computed optimal (date, slot)
    pub fn plan_recipe(&self, recipe_id: i64) -> PantryResult<PlannedEntry> {
        let recipe = self.recipes.get(recipe_id)?;
        let now = Utc::now();
        let today = now.date_naive();

        let queue = db::active_planned_entries(self.conn)?;
        let real = self.ledger().snapshot()?;
        let projected = projector::project(&real, &queue, self.recipes, now);
        let (date, slot) = compute_optimal_slot(recipe, &projected, &queue, today);

        let tx = self.conn.unchecked_transaction()?;
        let sel_id =
            db::insert_planned_entry(&tx, recipe_id, Some(date), slot, PlanStatus::Planned, now)?;
        tx.commit()?;

        info!("Planned recipe {recipe_id} '{}' for {date} {slot}", recipe.title);
        Ok(PlannedEntry {
            sel_id,
            recipe_id,
            planned_for: Some(date),
            slot,
            status: PlanStatus::Planned,
            created_at: now,
        })
    }

    /// The whole queue, dated entries first by date, undated last
    pub fn queue(&self) -> PantryResult<Vec<PlannedEntry>> {
        Ok(db::planned_entries(self.conn)?)
    }

    /// Still-planned entries only, same ordering as [`Self::queue`]
    pub fn active_queue(&self) -> PantryResult<Vec<PlannedEntry>> {
        Ok(db::active_planned_entries(self.conn)?)
    }

    /// The pantry as it will look after the active queue is cooked
    pub fn virtual_snapshot(&self) -> PantryResult<Vec<SnapshotItem>> {
        let queue = db::active_planned_entries(self.conn)?;
        let real = self.ledger().snapshot()?;
        Ok(projector::project(&real, &queue, self.recipes, Utc::now()))
    }

    /// Move a still-planned entry to a new date and slot.
    ///
    /// The (date, slot) pair must be free among the other active entries;
    /// a `None` date parks the entry as undecided. Slot eligibility is
    /// not enforced here; a manual edit may override the recipe's
    /// inferred slots.
    pub fn reschedule(
        &self,
        sel_id: i64,
        planned_for: Option<NaiveDate>,
        slot: MealSlot,
    ) -> PantryResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let entry = db::read_planned_entry(&tx, sel_id)?
            .ok_or_else(|| PantryError::NotFound(format!("planned entry {sel_id}")))?;
        if entry.status != PlanStatus::Planned {
            return Err(PantryError::InvalidTransition(format!(
                "cannot reschedule entry {sel_id} with status {}",
                entry.status
            )));
        }

        if let Some(date) = planned_for {
            if self.slot_conflicts(&tx, sel_id, date, slot)? {
                return Err(PantryError::SlotOccupied(format!("{date} {slot}")));
            }
        }
        db::update_planned_entry_schedule(&tx, sel_id, planned_for, slot)?;
        tx.commit()?;

        info!("Rescheduled entry {sel_id} to {planned_for:?} {slot}");
        Ok(())
    }

    /// Remove a planned or missed entry from the queue.
    ///
    /// Confirmed entries are history and stay; removing one fails with
    /// `InvalidTransition`.
    pub fn remove(&self, sel_id: i64) -> PantryResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let entry = db::read_planned_entry(&tx, sel_id)?
            .ok_or_else(|| PantryError::NotFound(format!("planned entry {sel_id}")))?;
        if entry.status == PlanStatus::Confirmed {
            return Err(PantryError::InvalidTransition(format!(
                "cannot remove confirmed entry {sel_id}"
            )));
        }
        db::delete_planned_entry(&tx, sel_id)?;
        tx.commit()?;

        info!("Removed entry {sel_id} (recipe {})", entry.recipe_id);
        Ok(())
    }

    /// Mark every planned entry whose date has passed as missed.
    ///
    /// Undated entries never go missed. Returns how many were swept.
    pub fn sweep_missed(&self, today: NaiveDate) -> PantryResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut missed = 0usize;
        for entry in db::active_planned_entries(&tx)? {
            if entry.is_overdue(today) {
                db::update_planned_entry_status(&tx, entry.sel_id, PlanStatus::Missed)?;
                missed += 1;
            }
        }
        tx.commit()?;

        if missed > 0 {
            info!("Swept {missed} overdue plans to missed");
        }
        Ok(missed)
    }

    /// Delete all missed entries; returns how many were purged
    pub fn purge_missed(&self) -> PantryResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut purged = 0usize;
        for entry in db::planned_entries(&tx)? {
            if entry.status == PlanStatus::Missed && db::delete_planned_entry(&tx, entry.sel_id)? {
                purged += 1;
            }
        }
        tx.commit()?;
        Ok(purged)
    }

    /// Cook a planned entry: top up stock, consume, mark confirmed.
    ///
    /// Shortfalls against current non-expired stock are purchased first
    /// as whole packages, so the meal is never left partially unfulfilled.
    /// Everything runs in one transaction; an unsourceable ingredient
    /// fails the call with `ProductUnavailable` and leaves the ledger
    /// untouched.
    pub fn confirm(&self, sel_id: i64) -> PantryResult<ConsumeReport> {
        let now = Utc::now();
        let tx = self.conn.unchecked_transaction()?;
        let entry = db::read_planned_entry(&tx, sel_id)?
            .ok_or_else(|| PantryError::NotFound(format!("planned entry {sel_id}")))?;
        if entry.status != PlanStatus::Planned {
            return Err(PantryError::InvalidTransition(format!(
                "entry {sel_id} is already {}",
                entry.status
            )));
        }
        let recipe = self.recipes.get(entry.recipe_id)?;

        let stock: Vec<SnapshotItem> = db::all_lots(&tx)?
            .into_iter()
            .filter(|lot| !lot.is_expired(now))
            .map(|lot| SnapshotItem {
                product_id: lot.product_id,
                quantity: lot.quantity,
                expiration: lot.expiration,
            })
            .collect();
        let purchases = grocery::needed_for_recipe(recipe, &stock, self.catalog)?;
        for item in &purchases.items {
            let product = self.catalog.get_product(item.product_id)?;
            let expiration = now + Duration::days(product.effective_shelf_life_days());
            db::insert_lot(
                &tx,
                item.product_id,
                item.purchased_quantity(),
                &product.unit,
                now,
                expiration,
            )?;
            info!(
                "Auto-purchased {} package(s) of {} ({} {}) for entry {sel_id}",
                item.packages,
                product.name,
                item.purchased_quantity(),
                product.unit
            );
        }

        let report = self
            .ledger()
            .consume_recipe_tx(&tx, entry.recipe_id, Some(sel_id), now)?;
        db::update_planned_entry_status(&tx, sel_id, PlanStatus::Confirmed)?;
        tx.commit()?;

        info!("Confirmed entry {sel_id} (recipe {})", entry.recipe_id);
        Ok(report)
    }

    /// Recompute schedules for the active queue.
    ///
    /// An entry keeps its manual date when that date is today or later,
    /// no later than the freshly computed optimum, and collision-free;
    /// anything else (including undated entries) moves to the computed
    /// (date, slot). Returns how many entries changed.
    pub fn refresh(&self, today: NaiveDate) -> PantryResult<usize> {
        let now = Utc::now();
        let real = self.ledger().snapshot()?;

        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0usize;
        for entry in db::active_planned_entries(&tx)? {
            let recipe = match self.recipes.get(entry.recipe_id) {
                Ok(recipe) => recipe,
                Err(_) => {
                    warn!(
                        "Refresh skipping entry {}: unknown recipe {}",
                        entry.sel_id, entry.recipe_id
                    );
                    continue;
                }
            };
            // Later entries see earlier moves through the re-read
            let others: Vec<PlannedEntry> = db::active_planned_entries(&tx)?
                .into_iter()
                .filter(|e| e.sel_id != entry.sel_id)
                .collect();
            let projected = projector::project(&real, &others, self.recipes, now);
            let (opt_date, opt_slot) = compute_optimal_slot(recipe, &projected, &others, today);

            let keep = match entry.planned_for {
                Some(date) => {
                    date >= today
                        && date <= opt_date
                        && !slot_taken(&others, date, entry.slot)
                }
                None => false,
            };
            if keep || (entry.planned_for == Some(opt_date) && entry.slot == opt_slot) {
                continue;
            }

            db::update_planned_entry_schedule(&tx, entry.sel_id, Some(opt_date), opt_slot)?;
            debug!(
                "Refresh moved entry {} to {opt_date} {opt_slot}",
                entry.sel_id
            );
            changed += 1;
        }
        tx.commit()?;

        if changed > 0 {
            info!("Refresh rescheduled {changed} queued plans");
        }
        Ok(changed)
    }

    fn slot_conflicts(
        &self,
        conn: &Connection,
        sel_id: i64,
        date: NaiveDate,
        slot: MealSlot,
    ) -> PantryResult<bool> {
        Ok(db::active_planned_entries(conn)?
            .iter()
            .any(|e| e.sel_id != sel_id && e.planned_for == Some(date) && e.slot == slot))
    }
}
