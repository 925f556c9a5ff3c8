//! # Waste Report Example
//!
//! This example bins already-expired stock, scores every remaining lot
//! for waste urgency, cooks the single most urgent recommendation and
//! prints the resulting event log, including the avoid events for
//! near-expiry stock saved in time.

use chrono::Utc;
use rusqlite::Connection;

use wastenot::db;
use wastenot::ledger::PantryLedger;
use wastenot::model::EventKind;
use wastenot::recommender::{recommend, RecommendOptions};
use wastenot::sample;
use wastenot::waste_score::{CategoryWeights, WasteScorer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let conn = Connection::open_in_memory()?;
    db::init_database_schema(&conn)?;

    let catalog = sample::sample_catalog();
    let recipes = sample::sample_recipes();
    let weights = CategoryWeights::default();
    let scorer = WasteScorer::new(&catalog, &weights);
    let ledger = PantryLedger::new(&conn, &catalog, &recipes);

    sample::seed_pantry(&conn, &catalog, 7)?;
    let now = Utc::now();

    let spoiled = ledger.trash_expired()?;
    if spoiled > 0 {
        println!("🗑️ Binned {spoiled} lot(s) that already expired\n");
    }

    let snapshot = ledger.snapshot()?;
    let mut scored: Vec<_> = snapshot
        .iter()
        .map(|item| (scorer.score(item, now), item))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    println!("📊 Waste urgency by lot (per unit):");
    for (score, item) in &scored {
        let name = catalog
            .get_product(item.product_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| format!("product {}", item.product_id));
        println!(
            "  • {name}: {:.1} units, {:.0}h left, urgency {score:.4}",
            item.quantity,
            item.hours_remaining(now)
        );
    }

    let options = RecommendOptions {
        max_missing: 2,
        category_filter: None,
        limit: 1,
    };
    match recommend(&recipes, &snapshot, &scorer, &options, now).first() {
        Some(pick) => {
            println!(
                "\n🍳 Cooking the most urgent pick: {} (score {:.3})",
                pick.title,
                pick.result.score
            );
            let report = ledger.consume_for_recipe(pick.recipe_id(), None)?;
            for line in &report.entries {
                println!(
                    "  • {}: used {:.1} of {:.1} {}",
                    line.name, line.consumed, line.requested, line.unit
                );
            }
        }
        None => println!("\n🍳 Nothing worth cooking; the pantry is too empty"),
    }

    println!("\n📒 Event log:");
    for kind in [EventKind::Consume, EventKind::Avoid, EventKind::Trash] {
        let events = ledger.events(Some(kind))?;
        println!("  {kind}: {} event(s)", events.len());
        if kind == EventKind::Avoid {
            for event in &events {
                println!(
                    "    ♻️ saved {:.1} {} from lot {:?} before it expired",
                    event.amount, event.unit, event.lot_id
                );
            }
        }
    }
    Ok(())
}
