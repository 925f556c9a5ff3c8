//! # WasteNot Pantry Core
//!
//! A household food-waste assistant core: a FEFO pantry ledger backed by
//! SQLite, expiration-urgency scoring, recipe matching and
//! recommendation, virtual-pantry projection and a meal-planning queue
//! that consumes stock when a plan is confirmed.

pub mod catalog;
pub mod db;
pub mod error;
pub mod grocery;
pub mod ledger;
pub mod model;
pub mod normalize;
pub mod planner;
pub mod projector;
pub mod recipe;
pub mod recipe_match;
pub mod recommender;
pub mod sample;
pub mod waste_score;
