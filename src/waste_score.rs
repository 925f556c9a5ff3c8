//! # Waste Scoring Module
//!
//! The single urgency scorer for pantry stock. A lot's per-unit score is
//! `multiplier / hours_remaining`: strictly decreasing in time left,
//! scaled by how perishable the product's category is. Expired stock
//! scores zero and is excluded from recommendation input; it is surfaced
//! through `trash_expired`, never through scoring.
//!
//! The category multiplier table is configuration data with a built-in
//! default, not hard-coded branches; ship an override as a flat JSON
//! object of `category -> multiplier`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, trace};
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::Catalog;
use crate::model::SnapshotItem;
use crate::normalize::CategoryClassifier;

/// Floor for the hours denominator, to keep near-expiry scores finite
pub const MIN_SCORE_HOURS: f64 = 1.0;

/// Multiplier applied to categories absent from the table
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Category-to-perishability multiplier table
#[derive(Debug, Clone)]
pub struct CategoryWeights {
    multipliers: HashMap<String, f64>,
    default: f64,
}

impl CategoryWeights {
    /// Build a table from explicit entries; keys are matched case-insensitively
    pub fn new(multipliers: HashMap<String, f64>, default: f64) -> Self {
        let multipliers = multipliers
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self {
            multipliers,
            default,
        }
    }

    /// Parse a table from a flat JSON object of `category -> multiplier`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let multipliers: HashMap<String, f64> =
            serde_json::from_str(json).context("Failed to parse category weights JSON")?;
        Ok(Self::new(multipliers, DEFAULT_MULTIPLIER))
    }

    /// Load a table from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read category weights file: {}",
                path.as_ref().display()
            )
        })?;
        Self::from_json_str(&json)
    }

    /// Multiplier for a category label, falling back to the default
    pub fn multiplier(&self, category: &str) -> f64 {
        self.multipliers
            .get(&category.to_lowercase())
            .copied()
            .unwrap_or(self.default)
    }

    /// Check whether the table has an explicit entry for a category
    pub fn contains(&self, category: &str) -> bool {
        self.multipliers.contains_key(&category.to_lowercase())
    }

    /// The fallback multiplier for unknown categories
    pub fn default_multiplier(&self) -> f64 {
        self.default
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        let mut multipliers = HashMap::new();
        // Store category groups, plus short aliases for bare labels.
        multipliers.insert("meat, seafood & plant-based".to_string(), 8.0);
        multipliers.insert("meat".to_string(), 8.0);
        multipliers.insert("seafood".to_string(), 8.0);
        multipliers.insert("fresh fruits & veggies".to_string(), 5.0);
        multipliers.insert("fresh produce".to_string(), 5.0);
        multipliers.insert("fresh prepared foods".to_string(), 5.0);
        multipliers.insert("dairy & eggs".to_string(), 3.0);
        multipliers.insert("cheese".to_string(), 2.5);
        multipliers.insert("bakery".to_string(), 2.0);
        multipliers.insert("dips, sauces & dressings".to_string(), 1.5);
        multipliers.insert("snacks & sweets".to_string(), 1.0);
        multipliers.insert("from the freezer".to_string(), 1.0);
        multipliers.insert("for the pantry".to_string(), 1.0);
        multipliers.insert("other".to_string(), 1.0);
        Self::new(multipliers, DEFAULT_MULTIPLIER)
    }
}

/// Per-lot urgency scorer over a catalog and multiplier table
pub struct WasteScorer<'a> {
    catalog: &'a Catalog,
    weights: &'a CategoryWeights,
    classifier: Option<&'a dyn CategoryClassifier>,
}

impl<'a> WasteScorer<'a> {
    /// Create a scorer without a category classifier
    pub fn new(catalog: &'a Catalog, weights: &'a CategoryWeights) -> Self {
        Self {
            catalog,
            weights,
            classifier: None,
        }
    }

    /// Attach a category classifier used when a product's own category
    /// label has no table entry
    pub fn with_classifier(mut self, classifier: &'a dyn CategoryClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Resolve the perishability multiplier for a product.
    ///
    /// Order: explicit table entry for the product's category, then the
    /// classifier's top-ranked main category, then the table default.
    pub fn multiplier_for(&self, product_id: i64) -> f64 {
        let product = match self.catalog.get_product(product_id) {
            Ok(product) => product,
            Err(_) => {
                debug!("Product {product_id} missing from catalog; default multiplier");
                return self.weights.default_multiplier();
            }
        };

        if self.weights.contains(&product.category) {
            return self.weights.multiplier(&product.category);
        }

        if let Some(classifier) = self.classifier {
            let predictions = classifier.predict_category(&product.name, 1);
            if let Some(top) = predictions.first() {
                trace!(
                    "Classifier mapped '{}' to '{}' for weighting",
                    product.name,
                    top.main_category
                );
                return self.weights.multiplier(&top.main_category);
            }
        }

        self.weights.default_multiplier()
    }

    /// Per-unit urgency of a snapshot item at the given instant.
    ///
    /// Returns 0.0 for expired stock; otherwise `multiplier / hours`,
    /// with hours floored at [`MIN_SCORE_HOURS`]. Multiply by a quantity
    /// used to get a lot's total contribution.
    pub fn score(&self, item: &SnapshotItem, now: DateTime<Utc>) -> f64 {
        let hours = item.hours_remaining(now);
        if hours <= 0.0 {
            return 0.0;
        }
        let multiplier = self.multiplier_for(item.product_id);
        multiplier / hours.max(MIN_SCORE_HOURS)
    }
}
