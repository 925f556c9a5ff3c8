//! # Sample Data Module
//!
//! A small built-in catalog and recipe book plus a seeded pantry
//! generator, used by the demos and anywhere a populated pantry is
//! needed without external JSON files. Seeding is deterministic per
//! seed value.

use chrono::{Duration, Utc};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

use crate::catalog::{Catalog, Product};
use crate::db;
use crate::error::PantryResult;
use crate::recipe::{Recipe, RecipeBook, RequiredIngredient};

fn product(
    id: i64,
    name: &str,
    unit: &str,
    package_quantity: f64,
    price: f64,
    category: &str,
    shelf_life_days: i64,
) -> Product {
    Product {
        id,
        name: name.to_string(),
        norm_name: None,
        unit: unit.to_string(),
        package_quantity,
        price: Some(price),
        url: None,
        category: category.to_string(),
        sub_category: None,
        shelf_life_days: Some(shelf_life_days),
    }
}

/// A thirteen-product store catalog spanning every weighted category
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        product(1, "Chicken Thighs", "oz", 16.0, 6.99, "Meat, Seafood & Plant-based", 3),
        product(2, "Atlantic Salmon Fillet", "oz", 12.0, 9.99, "Meat, Seafood & Plant-based", 2),
        product(3, "Baby Spinach", "oz", 6.0, 2.49, "Fresh Fruits & Veggies", 5),
        product(4, "Heirloom Tomatoes", "oz", 16.0, 4.29, "Fresh Fruits & Veggies", 6),
        product(5, "Cremini Mushrooms", "oz", 8.0, 2.99, "Fresh Fruits & Veggies", 7),
        product(6, "Whole Milk", "fl oz", 64.0, 3.49, "Dairy & Eggs", 10),
        product(7, "Large Eggs", "each", 12.0, 3.99, "Dairy & Eggs", 21),
        product(8, "Sharp Cheddar Block", "oz", 8.0, 4.49, "Cheese", 30),
        product(9, "Sourdough Loaf", "each", 1.0, 5.49, "Bakery", 4),
        product(10, "Basil Pesto", "oz", 6.3, 3.79, "Dips, Sauces & Dressings", 14),
        product(11, "Arborio Rice", "oz", 17.6, 3.99, "For the Pantry", 365),
        product(12, "Frozen Peas", "oz", 16.0, 1.89, "From the Freezer", 180),
        product(13, "Tortilla Chips", "oz", 11.0, 3.29, "Snacks & Sweets", 60),
    ])
}

fn need(name: &str, product_id: Option<i64>, quantity: f64, unit: &str) -> RequiredIngredient {
    RequiredIngredient {
        name: name.to_string(),
        raw_text: None,
        matched_product_id: product_id,
        quantity,
        unit: unit.to_string(),
    }
}

fn recipe(
    id: i64,
    title: &str,
    category: &str,
    serves: u32,
    ingredients: Vec<RequiredIngredient>,
) -> Recipe {
    Recipe {
        id,
        title: title.to_string(),
        category: category.to_string(),
        url: None,
        image_url: None,
        serves: Some(serves),
        time: None,
        ingredients,
        slots: Vec::new(),
    }
}

/// Eight recipes over the sample catalog, covering every meal slot
pub fn sample_recipes() -> RecipeBook {
    RecipeBook::new(vec![
        recipe(
            101,
            "Sheet Pan Chicken and Tomatoes",
            "Quick Dinners",
            2,
            vec![
                need("chicken thighs", Some(1), 12.0, "oz"),
                need("heirloom tomatoes", Some(4), 8.0, "oz"),
                need("olive oil", None, 2.0, "tbsp"),
            ],
        ),
        recipe(
            102,
            "Seared Salmon with Spinach",
            "Dinner",
            2,
            vec![
                need("salmon fillet", Some(2), 10.0, "oz"),
                need("baby spinach", Some(3), 4.0, "oz"),
                need("lemon", None, 1.0, "each"),
            ],
        ),
        recipe(
            103,
            "Mushroom Risotto",
            "Main Course",
            4,
            vec![
                need("arborio rice", Some(11), 8.8, "oz"),
                need("cremini mushrooms", Some(5), 6.0, "oz"),
                need("sharp cheddar", Some(8), 2.0, "oz"),
                need("vegetable stock", None, 32.0, "fl oz"),
            ],
        ),
        recipe(
            104,
            "Spinach Omelette",
            "Breakfast & Brunch",
            1,
            vec![
                need("large eggs", Some(7), 3.0, "each"),
                need("baby spinach", Some(3), 2.0, "oz"),
                need("whole milk", Some(6), 2.0, "fl oz"),
            ],
        ),
        recipe(
            105,
            "Pesto Grilled Cheese",
            "Sandwiches & Lunch",
            1,
            vec![
                need("sourdough loaf", Some(9), 0.5, "each"),
                need("sharp cheddar", Some(8), 2.0, "oz"),
                need("basil pesto", Some(10), 1.0, "oz"),
            ],
        ),
        recipe(
            106,
            "Cheddar Snack Plate",
            "Snacks & Appetizers",
            2,
            vec![
                need("sharp cheddar", Some(8), 3.0, "oz"),
                need("tortilla chips", Some(13), 4.0, "oz"),
            ],
        ),
        recipe(
            107,
            "Green Smoothie",
            "Smoothies & Juices",
            1,
            vec![
                need("baby spinach", Some(3), 2.0, "oz"),
                need("whole milk", Some(6), 8.0, "fl oz"),
            ],
        ),
        recipe(
            108,
            "Peas and Rice Bowl",
            "Vegetarian",
            2,
            vec![
                need("arborio rice", Some(11), 8.8, "oz"),
                need("frozen peas", Some(12), 8.0, "oz"),
            ],
        ),
    ])
}

/// Fill the pantry with 0-2 partially used lots per catalog product.
///
/// Most lots land somewhere inside their shelf life; short-lived
/// products also get the occasional lot that is already past it. The
/// same seed always produces the same pantry. Returns the number of
/// lots created.
pub fn seed_pantry(conn: &Connection, catalog: &Catalog, seed: u64) -> PantryResult<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let now = Utc::now();

    let tx = conn.unchecked_transaction()?;
    let mut created = 0usize;
    for product in catalog.products() {
        let lot_count = rng.gen_range(0..=2);
        for _ in 0..lot_count {
            let fraction: f64 = rng.gen_range(0.25..=1.0);
            let quantity = (product.package_quantity * fraction * 10.0).round() / 10.0;
            // Ages may exceed the shelf life by a day, so short-lived
            // products sometimes seed an already-expired lot.
            let age_days = rng.gen_range(0..product.effective_shelf_life_days().max(1) + 2);
            let date_added = now - Duration::days(age_days);
            let expiration = date_added + Duration::days(product.effective_shelf_life_days());

            db::insert_lot(&tx, product.id, quantity, &product.unit, date_added, expiration)?;
            created += 1;
        }
    }
    tx.commit()?;

    info!("Seeded pantry with {created} lots (seed {seed})");
    Ok(created)
}
