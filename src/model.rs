//! # Pantry Domain Model
//!
//! This module defines the data structures shared across the pantry core:
//! inventory lots, the append-only event log, the meal-planning queue and
//! the fixed meal-slot vocabulary.
//!
//! ## Core Concepts
//!
//! - **Lot**: one physical addition of a product to the pantry, with its
//!   own remaining quantity and expiration date
//! - **SnapshotItem**: a flattened, read-only view of a lot used for
//!   scoring and virtual-pantry projection
//! - **PantryEvent**: an append-only audit record (consume/trash/avoid)
//! - **PlannedEntry**: a recipe queued for a (date, meal-slot) pair
//!
//! ## Usage
//!
//! ```rust
//! use wastenot::model::{MealSlot, PlanStatus};
//!
//! let slots = MealSlot::infer("Quick Dinners");
//! assert_eq!(slots, vec![MealSlot::Dinner]);
//! assert_eq!(PlanStatus::Planned.as_str(), "planned");
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single physical addition of a product to the pantry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Unique lot id (SQLite rowid)
    pub id: i64,

    /// Catalog product this lot holds
    pub product_id: i64,

    /// Quantity remaining, in pantry units; never negative
    pub quantity: f64,

    /// Unit label carried from the product (e.g. "oz", "each")
    pub unit: String,

    /// When the lot entered the pantry
    pub date_added: DateTime<Utc>,

    /// When the lot expires (date_added + shelf life)
    pub expiration: DateTime<Utc>,
}

impl Lot {
    /// Check whether the lot is expired at the given instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }

    /// Fractional hours until expiration; negative once expired
    pub fn hours_remaining(&self, now: DateTime<Utc>) -> f64 {
        (self.expiration - now).num_seconds() as f64 / 3600.0
    }

    /// Check whether the lot expires within the given number of days
    pub fn expires_within(&self, now: DateTime<Utc>, days: i64) -> bool {
        self.expiration - now <= Duration::days(days)
    }
}

/// A lot joined with its product's display fields, for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotView {
    /// The underlying lot
    pub lot: Lot,

    /// Product display name
    pub product_name: String,

    /// Product category label
    pub category: String,
}

/// Flattened lot view handed to the scorer and projector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    /// Catalog product id
    pub product_id: i64,

    /// Quantity remaining
    pub quantity: f64,

    /// Expiration instant
    pub expiration: DateTime<Utc>,
}

impl SnapshotItem {
    /// Fractional hours until expiration; negative once expired
    pub fn hours_remaining(&self, now: DateTime<Utc>) -> f64 {
        (self.expiration - now).num_seconds() as f64 / 3600.0
    }
}

/// Kinds of pantry audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Stock drawn down for a recipe
    Consume,
    /// Stock discarded
    Trash,
    /// Near-expiry stock consumed before it could spoil
    Avoid,
}

impl EventKind {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Consume => "consume",
            EventKind::Trash => "trash",
            EventKind::Avoid => "avoid",
        }
    }

    /// Parse the storage string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "consume" => Some(EventKind::Consume),
            "trash" => Some(EventKind::Trash),
            "avoid" => Some(EventKind::Avoid),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only audit record of a pantry mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryEvent {
    /// Unique event id
    pub id: i64,

    /// Source lot; None once the lot has been deleted
    pub lot_id: Option<i64>,

    /// What happened
    pub kind: EventKind,

    /// Quantity involved
    pub amount: f64,

    /// Unit label at the time of the event
    pub unit: String,

    /// When the event was recorded
    pub timestamp: DateTime<Utc>,

    /// Planned entry that triggered the event, if any
    pub planned_entry_id: Option<i64>,
}

/// Lifecycle state of a queued meal plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Queued, not yet cooked
    Planned,
    /// Locked in and consumed from the real ledger; terminal
    Confirmed,
    /// Planned date elapsed without confirmation; terminal
    Missed,
}

impl PlanStatus {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Planned => "planned",
            PlanStatus::Confirmed => "confirmed",
            PlanStatus::Missed => "missed",
        }
    }

    /// Parse the storage string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(PlanStatus::Planned),
            "confirmed" => Some(PlanStatus::Confirmed),
            "missed" => Some(PlanStatus::Missed),
            _ => None,
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scheduling buckets a recipe may occupy on a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Between-meal bite
    Snack,
    /// Sweet course
    Dessert,
    /// Drinks
    Beverage,
}

impl MealSlot {
    /// All slots in canonical order
    pub fn all() -> [MealSlot; 6] {
        [
            MealSlot::Breakfast,
            MealSlot::Lunch,
            MealSlot::Dinner,
            MealSlot::Snack,
            MealSlot::Dessert,
            MealSlot::Beverage,
        ]
    }

    /// Stable string form used in storage and display
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
            MealSlot::Dessert => "dessert",
            MealSlot::Beverage => "beverage",
        }
    }

    /// Parse the storage string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "breakfast" => Some(MealSlot::Breakfast),
            "lunch" => Some(MealSlot::Lunch),
            "dinner" => Some(MealSlot::Dinner),
            "snack" => Some(MealSlot::Snack),
            "dessert" => Some(MealSlot::Dessert),
            "beverage" => Some(MealSlot::Beverage),
            _ => None,
        }
    }

    /// Keywords that mark a category label as eligible for this slot
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            MealSlot::Breakfast => &["breakfast", "brunch", "pancake", "oatmeal"],
            MealSlot::Lunch => &["lunch", "sandwich", "salad", "wrap"],
            MealSlot::Dinner => &["dinner", "supper", "main dish", "main course"],
            MealSlot::Snack => &["snack", "appetizer", "finger food"],
            MealSlot::Dessert => &["dessert", "cake", "cookie", "sweet"],
            MealSlot::Beverage => &["beverage", "drink", "smoothie", "juice", "cocktail"],
        }
    }

    /// Infer eligible slots from a free-text recipe category label.
    ///
    /// Runs the keyword membership test once, at recipe load time; a label
    /// can map to several slots (e.g. "Salads & Snacks"). Returns an empty
    /// list when nothing matches; the recipe loader applies its fallback.
    pub fn infer(category: &str) -> Vec<MealSlot> {
        let lowered = category.to_lowercase();
        MealSlot::all()
            .into_iter()
            .filter(|slot| slot.keywords().iter().any(|kw| lowered.contains(kw)))
            .collect()
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recipe queued for cooking on a (date, meal-slot) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedEntry {
    /// Unique selection id
    pub sel_id: i64,

    /// Recipe to cook
    pub recipe_id: i64,

    /// Date the user intends to cook; None while undecided
    pub planned_for: Option<NaiveDate>,

    /// Scheduling bucket on that date
    pub slot: MealSlot,

    /// Lifecycle state
    pub status: PlanStatus,

    /// When the entry was queued
    pub created_at: DateTime<Utc>,
}

impl PlannedEntry {
    /// Check whether the entry still occupies its (date, slot) pair
    pub fn is_active(&self) -> bool {
        self.status == PlanStatus::Planned
    }

    /// Check whether the planned date has elapsed without confirmation
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == PlanStatus::Planned
            && self.planned_for.map(|d| d < today).unwrap_or(false)
    }
}
