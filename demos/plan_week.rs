//! # Weekly Planning Example
//!
//! This example seeds a pantry, asks the recommender what to cook against
//! the virtual pantry, queues the top picks, prints the grocery gap and
//! confirms the first meal.

use chrono::Utc;
use rusqlite::Connection;

use wastenot::db;
use wastenot::grocery;
use wastenot::ledger::PantryLedger;
use wastenot::planner::MealPlanner;
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

    let seeded = sample::seed_pantry(&conn, &catalog, 2024)?;
    println!("🥫 Seeded pantry with {seeded} lots\n");

    let ledger = PantryLedger::new(&conn, &catalog, &recipes);
    let spoiled = ledger.trash_expired()?;
    if spoiled > 0 {
        println!("🗑️ Cleared {spoiled} expired lot(s) first\n");
    }

    println!("⏳ Expiring soonest:");
    for view in ledger.expiring_soonest(5)? {
        println!(
            "  • {}: {:.1} {} (expires {})",
            view.product_name,
            view.lot.quantity,
            view.lot.unit,
            view.lot.expiration.format("%Y-%m-%d")
        );
    }

    // Queue three meals one at a time; each pick scores against the
    // virtual pantry, so a queued meal's ingredients stop counting.
    let planner = MealPlanner::new(&conn, &catalog, &recipes);
    let now = Utc::now();
    println!("\n🍽️ Planning the week:");
    let mut queued = Vec::new();
    for _ in 0..3 {
        let snapshot = planner.virtual_snapshot()?;
        let options = RecommendOptions {
            max_missing: 1,
            category_filter: None,
            limit: 1,
        };
        let pick = match recommend(&recipes, &snapshot, &scorer, &options, now).into_iter().next() {
            Some(pick) => pick,
            None => {
                println!("  (pantry exhausted, stopping early)");
                break;
            }
        };

        let entry = planner.plan_recipe(pick.recipe_id())?;
        let date = entry
            .planned_for
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unscheduled".to_string());
        println!(
            "  ✅ {} (score {:.3}, missing {}) planned for {date} {}",
            pick.title, pick.result.score, pick.result.missing_count, entry.slot
        );
        queued.push(entry);
    }

    let queue = planner.active_queue()?;
    let list = grocery::grocery_list(&queue, &recipes, &ledger.snapshot()?, &catalog)?;
    if list.is_empty() {
        println!("\n🛒 Nothing to buy; the queue cooks from stock");
    } else {
        println!(
            "\n🛒 Grocery list ({} product(s), about ${:.2}):",
            list.len(),
            list.estimated_total()
        );
        for item in &list.items {
            println!(
                "  • {}: {} package(s) to cover {:.1} {}",
                item.name, item.packages, item.shortfall, item.unit
            );
        }
    }

    if let Some(first) = queued.first() {
        let report = planner.confirm(first.sel_id)?;
        println!("\n👩‍🍳 Cooked the first planned meal:");
        for line in &report.entries {
            println!(
                "  • {}: used {:.1} of {:.1} {}",
                line.name, line.consumed, line.requested, line.unit
            );
        }
    }

    println!("\n📦 Lots remaining: {}", ledger.list_lots(None)?.len());
    Ok(())
}
