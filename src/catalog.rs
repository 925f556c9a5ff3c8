//! # Product Catalog Module
//!
//! Read-only reference data for everything the pantry can hold: display
//! name, unit, package quantity, category and shelf life per product.
//! The catalog is supplied externally (JSON) and held in memory for the
//! session; it is never mutated by pantry operations.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{PantryError, PantryResult};
use crate::normalize;

/// Shelf life applied when a product does not declare one, in days
pub const DEFAULT_SHELF_LIFE_DAYS: i64 = 7;

/// A grocery product as stocked by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product id
    pub id: i64,

    /// Display name (e.g. "Organic Chicken Thighs 16 oz")
    pub name: String,

    /// Canonical lowercase name used for matching; computed at load when absent
    #[serde(default)]
    pub norm_name: Option<String>,

    /// Unit label (e.g. "oz", "each")
    pub unit: String,

    /// Numeric amount per package (e.g. 16.0 for "16 oz")
    pub package_quantity: f64,

    /// Price per package, if known
    #[serde(default)]
    pub price: Option<f64>,

    /// Store page for the product, if known
    #[serde(default)]
    pub url: Option<String>,

    /// Category label (e.g. "Meat, Seafood & Plant-based")
    pub category: String,

    /// Finer category label, if known
    #[serde(default)]
    pub sub_category: Option<String>,

    /// Days until expiration from purchase; None means unknown
    #[serde(default)]
    pub shelf_life_days: Option<i64>,
}

impl Product {
    /// Shelf life in days, falling back to [`DEFAULT_SHELF_LIFE_DAYS`]
    pub fn effective_shelf_life_days(&self) -> i64 {
        self.shelf_life_days.unwrap_or(DEFAULT_SHELF_LIFE_DAYS)
    }

    /// Canonical name for matching, already lowercased
    pub fn canonical_name(&self) -> &str {
        self.norm_name.as_deref().unwrap_or(&self.name)
    }
}

/// In-memory, immutable product catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: HashMap<i64, usize>,
}

impl Catalog {
    /// Build a catalog from a product list, computing missing canonical names
    pub fn new(mut products: Vec<Product>) -> Self {
        for product in &mut products {
            if product.norm_name.is_none() {
                product.norm_name = Some(normalize::normalize(&product.name));
            }
        }
        let by_id = products
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id, idx))
            .collect();
        info!("Catalog loaded with {} products", products.len());
        Self { products, by_id }
    }

    /// Parse a catalog from a JSON array of products
    pub fn from_json_str(json: &str) -> Result<Self> {
        let products: Vec<Product> =
            serde_json::from_str(json).context("Failed to parse catalog JSON")?;
        Ok(Self::new(products))
    }

    /// Load a catalog from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read catalog file: {}", path.as_ref().display())
        })?;
        Self::from_json_str(&json)
    }

    /// Look up a product by id
    pub fn get_product(&self, product_id: i64) -> PantryResult<&Product> {
        self.by_id
            .get(&product_id)
            .map(|&idx| &self.products[idx])
            .ok_or_else(|| PantryError::NotFound(format!("product {product_id}")))
    }

    /// Check whether a product id exists
    pub fn contains(&self, product_id: i64) -> bool {
        self.by_id.contains_key(&product_id)
    }

    /// Find products by category and/or name substring.
    ///
    /// The category filter is a case-insensitive substring test against the
    /// category label; the name filter is normalized first and tested
    /// against each product's canonical name.
    pub fn find_products(
        &self,
        category: Option<&str>,
        name_substring: Option<&str>,
    ) -> Vec<&Product> {
        let category_lower = category.map(|c| c.to_lowercase());
        let name_query = name_substring.map(normalize::normalize);
        debug!(
            "Catalog search: category={:?} name={:?}",
            category_lower, name_query
        );

        self.products
            .iter()
            .filter(|p| {
                category_lower
                    .as_ref()
                    .map(|c| p.category.to_lowercase().contains(c.as_str()))
                    .unwrap_or(true)
            })
            .filter(|p| {
                name_query
                    .as_ref()
                    .map(|q| p.canonical_name().contains(q.as_str()))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// All products, in load order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products in the catalog
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, category: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            norm_name: None,
            unit: "oz".to_string(),
            package_quantity: 16.0,
            price: None,
            url: None,
            category: category.to_string(),
            sub_category: None,
            shelf_life_days: Some(5),
        }
    }

    #[test]
    fn test_get_product_found_and_missing() {
        let catalog = Catalog::new(vec![product(1, "Chicken Thighs", "Meat")]);
        assert_eq!(catalog.get_product(1).unwrap().name, "Chicken Thighs");
        assert!(matches!(
            catalog.get_product(99),
            Err(PantryError::NotFound(_))
        ));
    }

    #[test]
    fn test_find_products_by_category_substring() {
        let catalog = Catalog::new(vec![
            product(1, "Chicken Thighs", "Meat, Seafood & Plant-based"),
            product(2, "Cheddar Block", "Cheese"),
            product(3, "Frozen Peas", "From the Freezer"),
        ]);
        let meats = catalog.find_products(Some("seafood"), None);
        assert_eq!(meats.len(), 1);
        assert_eq!(meats[0].id, 1);

        let all = catalog.find_products(None, None);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_find_products_by_normalized_name() {
        let catalog = Catalog::new(vec![
            product(1, "Organic Chicken Thighs", "Meat"),
            product(2, "Cheddar Block", "Cheese"),
        ]);
        // Query arrives plural; canonical names are singular.
        let hits = catalog.find_products(None, Some("thighs"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_default_shelf_life_fallback() {
        let mut p = product(1, "Mystery Jar", "For the Pantry");
        p.shelf_life_days = None;
        assert_eq!(p.effective_shelf_life_days(), DEFAULT_SHELF_LIFE_DAYS);
        p.shelf_life_days = Some(3);
        assert_eq!(p.effective_shelf_life_days(), 3);
    }

    #[test]
    fn test_from_json_str() -> Result<()> {
        let json = r#"[
            {"id": 1, "name": "Baby Spinach", "unit": "oz",
             "package_quantity": 6.0, "category": "Fresh Fruits & Veggies",
             "shelf_life_days": 4}
        ]"#;
        let catalog = Catalog::from_json_str(json)?;
        assert_eq!(catalog.len(), 1);
        let p = catalog.get_product(1).unwrap();
        assert_eq!(p.canonical_name(), "spinach");
        Ok(())
    }
}
