//! # Pantry Error Types Module
//!
//! This module defines the error types used throughout the pantry core.
//! Quantity shortfalls are deliberately *not* an error here: they are
//! reported as data (see `ConsumeReport`) so the recommender can keep
//! ranking partially-stocked recipes.

/// Custom error types for pantry, planning and catalog operations
#[derive(Debug, Clone)]
pub enum PantryError {
    /// Unknown product, lot, recipe or planned-entry id
    NotFound(String),
    /// Planned-entry state machine violation (e.g. confirming twice)
    InvalidTransition(String),
    /// A (date, meal-slot) pair is already taken by another queued entry
    SlotOccupied(String),
    /// A required product cannot be sourced from the catalog anymore
    ProductUnavailable(String),
    /// Underlying storage failure
    Database(String),
}

impl std::fmt::Display for PantryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PantryError::NotFound(msg) => write!(f, "Not found: {msg}"),
            PantryError::InvalidTransition(msg) => write!(f, "Invalid transition: {msg}"),
            PantryError::SlotOccupied(msg) => write!(f, "Slot occupied: {msg}"),
            PantryError::ProductUnavailable(msg) => write!(f, "Product unavailable: {msg}"),
            PantryError::Database(msg) => write!(f, "Database error: {msg}"),
        }
    }
}

impl std::error::Error for PantryError {}

impl From<rusqlite::Error> for PantryError {
    fn from(err: rusqlite::Error) -> Self {
        PantryError::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PantryError {
    fn from(err: anyhow::Error) -> Self {
        PantryError::Database(err.to_string())
    }
}

/// Convenience alias for core operations
pub type PantryResult<T> = Result<T, PantryError>;
