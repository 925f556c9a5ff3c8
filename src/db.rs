use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use rusqlite::{params, Connection};

use crate::model::{EventKind, Lot, MealSlot, PantryEvent, PlanStatus, PlannedEntry};

/// Initialize the database schema
pub fn init_database_schema(conn: &Connection) -> Result<()> {
    info!("Initializing database schema...");

    // Needed for ON DELETE SET NULL on the event log
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .context("Failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL,
            quantity REAL NOT NULL,
            unit TEXT NOT NULL,
            date_added TEXT NOT NULL,
            expiration TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create lots table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lots_product ON lots(product_id)",
        [],
    )
    .context("Failed to create lots product index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lots_expiration ON lots(expiration)",
        [],
    )
    .context("Failed to create lots expiration index")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS planned_entries (
            sel_id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL,
            planned_for TEXT,
            meal_slot TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'planned',
            created_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create planned_entries table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS pantry_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lot_id INTEGER REFERENCES lots(id) ON DELETE SET NULL,
            event_type TEXT NOT NULL,
            amount REAL NOT NULL,
            unit TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            planned_entry_id INTEGER REFERENCES planned_entries(sel_id) ON DELETE SET NULL
        )",
        [],
    )
    .context("Failed to create pantry_events table")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn lot_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lot> {
    Ok(Lot {
        id: row.get(0)?,
        product_id: row.get(1)?,
        quantity: row.get(2)?,
        unit: row.get(3)?,
        date_added: row.get(4)?,
        expiration: row.get(5)?,
    })
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlannedEntry> {
    let slot_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let slot = MealSlot::parse(&slot_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown meal slot '{slot_str}'").into(),
        )
    })?;
    let status = PlanStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown plan status '{status_str}'").into(),
        )
    })?;
    Ok(PlannedEntry {
        sel_id: row.get(0)?,
        recipe_id: row.get(1)?,
        planned_for: row.get(2)?,
        slot,
        status,
        created_at: row.get(5)?,
    })
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PantryEvent> {
    let kind_str: String = row.get(2)?;
    let kind = EventKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown event type '{kind_str}'").into(),
        )
    })?;
    Ok(PantryEvent {
        id: row.get(0)?,
        lot_id: row.get(1)?,
        kind,
        amount: row.get(3)?,
        unit: row.get(4)?,
        timestamp: row.get(5)?,
        planned_entry_id: row.get(6)?,
    })
}

/// Insert a new lot, returning its id
pub fn insert_lot(
    conn: &Connection,
    product_id: i64,
    quantity: f64,
    unit: &str,
    date_added: DateTime<Utc>,
    expiration: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO lots (product_id, quantity, unit, date_added, expiration)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![product_id, quantity, unit, date_added, expiration],
    )
    .context("Failed to insert lot")?;

    let lot_id = conn.last_insert_rowid();
    info!("Lot {lot_id} created for product {product_id} (qty {quantity} {unit})");
    Ok(lot_id)
}

/// Read a lot by id
pub fn read_lot(conn: &Connection, lot_id: i64) -> Result<Option<Lot>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, product_id, quantity, unit, date_added, expiration
             FROM lots WHERE id = ?1",
        )
        .context("Failed to prepare lot read statement")?;

    match stmt.query_row(params![lot_id], lot_from_row) {
        Ok(lot) => Ok(Some(lot)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context("Failed to read lot"),
    }
}

/// Overwrite a lot's remaining quantity
pub fn update_lot_quantity(conn: &Connection, lot_id: i64, quantity: f64) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "UPDATE lots SET quantity = ?1 WHERE id = ?2",
            params![quantity, lot_id],
        )
        .context("Failed to update lot quantity")?;

    if rows_affected > 0 {
        info!("Lot {lot_id} quantity set to {quantity}");
    }
    Ok(rows_affected > 0)
}

/// Delete a lot
pub fn delete_lot(conn: &Connection, lot_id: i64) -> Result<bool> {
    let rows_affected = conn
        .execute("DELETE FROM lots WHERE id = ?1", params![lot_id])
        .context("Failed to delete lot")?;

    if rows_affected > 0 {
        info!("Lot {lot_id} deleted");
    }
    Ok(rows_affected > 0)
}

/// All lots of one product, soonest expiration first (FEFO order)
pub fn lots_for_product(conn: &Connection, product_id: i64) -> Result<Vec<Lot>> {
    debug!("Listing lots for product {product_id}");
    let mut stmt = conn
        .prepare(
            "SELECT id, product_id, quantity, unit, date_added, expiration
             FROM lots WHERE product_id = ?1
             ORDER BY expiration ASC, id ASC",
        )
        .context("Failed to prepare product lots statement")?;

    let lots = stmt
        .query_map(params![product_id], lot_from_row)
        .context("Failed to query product lots")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to map product lots")?;
    Ok(lots)
}

/// All lots in the pantry, soonest expiration first
pub fn all_lots(conn: &Connection) -> Result<Vec<Lot>> {
    debug!("Listing all lots");
    let mut stmt = conn
        .prepare(
            "SELECT id, product_id, quantity, unit, date_added, expiration
             FROM lots ORDER BY expiration ASC, id ASC",
        )
        .context("Failed to prepare all lots statement")?;

    let lots = stmt
        .query_map([], lot_from_row)
        .context("Failed to query lots")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to map lots")?;
    Ok(lots)
}

/// Lots whose expiration lies strictly before the cutoff
pub fn lots_expiring_before(conn: &Connection, cutoff: DateTime<Utc>) -> Result<Vec<Lot>> {
    debug!("Listing lots expiring before {cutoff}");
    let mut stmt = conn
        .prepare(
            "SELECT id, product_id, quantity, unit, date_added, expiration
             FROM lots WHERE expiration < ?1
             ORDER BY expiration ASC, id ASC",
        )
        .context("Failed to prepare expiring lots statement")?;

    let lots = stmt
        .query_map(params![cutoff], lot_from_row)
        .context("Failed to query expiring lots")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to map expiring lots")?;
    Ok(lots)
}

/// Append a pantry event, returning its id
pub fn insert_event(
    conn: &Connection,
    lot_id: Option<i64>,
    kind: EventKind,
    amount: f64,
    unit: &str,
    timestamp: DateTime<Utc>,
    planned_entry_id: Option<i64>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO pantry_events (lot_id, event_type, amount, unit, timestamp, planned_entry_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            lot_id,
            kind.as_str(),
            amount,
            unit,
            timestamp,
            planned_entry_id
        ],
    )
    .context("Failed to insert pantry event")?;

    let event_id = conn.last_insert_rowid();
    debug!("Event {event_id} recorded: {kind} {amount} {unit} (lot {lot_id:?})");
    Ok(event_id)
}

/// Read the event log in append order, optionally filtered by kind
pub fn list_events(conn: &Connection, kind: Option<EventKind>) -> Result<Vec<PantryEvent>> {
    debug!("Listing events (kind filter: {kind:?})");
    let mut stmt = conn
        .prepare(
            "SELECT id, lot_id, event_type, amount, unit, timestamp, planned_entry_id
             FROM pantry_events
             WHERE (?1 IS NULL OR event_type = ?1)
             ORDER BY id ASC",
        )
        .context("Failed to prepare events statement")?;

    let events = stmt
        .query_map(params![kind.map(|k| k.as_str())], event_from_row)
        .context("Failed to query events")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to map events")?;
    Ok(events)
}

/// Insert a planned entry, returning its selection id
pub fn insert_planned_entry(
    conn: &Connection,
    recipe_id: i64,
    planned_for: Option<NaiveDate>,
    slot: MealSlot,
    status: PlanStatus,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO planned_entries (recipe_id, planned_for, meal_slot, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            recipe_id,
            planned_for,
            slot.as_str(),
            status.as_str(),
            created_at
        ],
    )
    .context("Failed to insert planned entry")?;

    let sel_id = conn.last_insert_rowid();
    info!("Planned entry {sel_id} created for recipe {recipe_id} ({slot}, {planned_for:?})");
    Ok(sel_id)
}

/// Read a planned entry by selection id
pub fn read_planned_entry(conn: &Connection, sel_id: i64) -> Result<Option<PlannedEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT sel_id, recipe_id, planned_for, meal_slot, status, created_at
             FROM planned_entries WHERE sel_id = ?1",
        )
        .context("Failed to prepare planned entry read statement")?;

    match stmt.query_row(params![sel_id], entry_from_row) {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context("Failed to read planned entry"),
    }
}

/// All planned entries, dated ones first in date order, undated last
pub fn planned_entries(conn: &Connection) -> Result<Vec<PlannedEntry>> {
    debug!("Listing planned entries");
    let mut stmt = conn
        .prepare(
            "SELECT sel_id, recipe_id, planned_for, meal_slot, status, created_at
             FROM planned_entries
             ORDER BY planned_for IS NULL, planned_for ASC, sel_id ASC",
        )
        .context("Failed to prepare planned entries statement")?;

    let entries = stmt
        .query_map([], entry_from_row)
        .context("Failed to query planned entries")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to map planned entries")?;
    Ok(entries)
}

/// Planned entries still in `planned` status, in the same order
pub fn active_planned_entries(conn: &Connection) -> Result<Vec<PlannedEntry>> {
    debug!("Listing active planned entries");
    let mut stmt = conn
        .prepare(
            "SELECT sel_id, recipe_id, planned_for, meal_slot, status, created_at
             FROM planned_entries WHERE status = 'planned'
             ORDER BY planned_for IS NULL, planned_for ASC, sel_id ASC",
        )
        .context("Failed to prepare active entries statement")?;

    let entries = stmt
        .query_map([], entry_from_row)
        .context("Failed to query active entries")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to map active entries")?;
    Ok(entries)
}

/// Move a planned entry to a new (date, slot) pair
pub fn update_planned_entry_schedule(
    conn: &Connection,
    sel_id: i64,
    planned_for: Option<NaiveDate>,
    slot: MealSlot,
) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "UPDATE planned_entries SET planned_for = ?1, meal_slot = ?2 WHERE sel_id = ?3",
            params![planned_for, slot.as_str(), sel_id],
        )
        .context("Failed to update planned entry schedule")?;

    if rows_affected > 0 {
        info!("Planned entry {sel_id} rescheduled to {planned_for:?} {slot}");
    }
    Ok(rows_affected > 0)
}

/// Set a planned entry's lifecycle status
pub fn update_planned_entry_status(
    conn: &Connection,
    sel_id: i64,
    status: PlanStatus,
) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "UPDATE planned_entries SET status = ?1 WHERE sel_id = ?2",
            params![status.as_str(), sel_id],
        )
        .context("Failed to update planned entry status")?;

    if rows_affected > 0 {
        info!("Planned entry {sel_id} marked {status}");
    }
    Ok(rows_affected > 0)
}

/// Delete a planned entry
pub fn delete_planned_entry(conn: &Connection, sel_id: i64) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM planned_entries WHERE sel_id = ?1",
            params![sel_id],
        )
        .context("Failed to delete planned entry")?;

    if rows_affected > 0 {
        info!("Planned entry {sel_id} deleted");
    }
    Ok(rows_affected > 0)
}

/// Wipe all pantry state: lots, planned entries and the event log
pub fn clear_all(conn: &Connection) -> Result<()> {
    info!("Clearing all pantry tables");
    conn.execute("DELETE FROM pantry_events", [])
        .context("Failed to clear pantry_events")?;
    conn.execute("DELETE FROM planned_entries", [])
        .context("Failed to clear planned_entries")?;
    conn.execute("DELETE FROM lots", [])
        .context("Failed to clear lots")?;
    Ok(())
}
