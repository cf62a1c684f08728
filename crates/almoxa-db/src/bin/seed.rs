//! # Seed Data Generator
//!
//! Populates the database with a realistic maintenance-parts catalog for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 items (default)
//! cargo run -p almoxa-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p almoxa-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p almoxa-db --bin seed -- --db ./data/almoxa.db
//! ```
//!
//! Every item goes through the ledger transaction — the seeder never raw
//! inserts — so each one gets a fixed code from the sequence and an
//! opening-balance movement, exactly like production data.

use std::env;

use almoxa_core::{Money, NewStockItem};
use almoxa_db::{Database, DbConfig};

/// Part families for realistic test data: (classification, descriptions)
const FAMILIES: &[(&str, &[&str])] = &[
    (
        "filtros",
        &[
            "Filtro de óleo",
            "Filtro de ar",
            "Filtro de combustível",
            "Filtro hidráulico",
            "Filtro separador de água",
            "Elemento filtrante",
        ],
    ),
    (
        "rolamentos",
        &[
            "Rolamento 6204",
            "Rolamento 6305",
            "Rolamento cônico 30206",
            "Rolamento axial 51105",
            "Mancal P205",
            "Bucha de bronze 20x25",
        ],
    ),
    (
        "correias",
        &[
            "Correia A-42",
            "Correia B-56",
            "Correia dentada 8M",
            "Polia canal A 100mm",
            "Esticador de correia",
        ],
    ),
    (
        "vedacao",
        &[
            "Retentor 25x40x7",
            "Anel o-ring 2-214",
            "Junta de papelão hidráulico",
            "Gaxeta de teflon 1/4",
            "Selo mecânico 20mm",
        ],
    ),
    (
        "eletrica",
        &[
            "Contator 25A",
            "Relé térmico 17-25A",
            "Fusível NH 63A",
            "Disjuntor motor 10A",
            "Sensor indutivo M18",
            "Cabo PP 4x2,5mm",
        ],
    ),
    (
        "lubrificantes",
        &[
            "Graxa EP-2",
            "Óleo ISO VG 68",
            "Óleo 15W40",
            "Desengripante spray",
            "Fluido de corte solúvel",
        ],
    ),
];

/// Manufacturers cycled across the catalog.
const MANUFACTURERS: &[&str] = &["Bosch", "SKF", "Gates", "WEG", "Vedamotors", "Petronas", "Mann"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./almoxa_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Almoxa Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./almoxa_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Almoxa Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.stock().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating items...");

    let mut generated = 0usize;
    let start = std::time::Instant::now();

    'outer: loop {
        for (family, descriptions) in FAMILIES {
            for description in *descriptions {
                if generated >= count {
                    break 'outer;
                }

                let item = generate_item(family, description, generated);

                if let Err(e) = db.stock().create(item).await {
                    eprintln!("Failed to insert '{}': {}", description, e);
                    continue;
                }

                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} items...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} items in {:?}", generated, elapsed);
    println!(
        "  Rate: {:.0} items/second",
        generated as f64 / elapsed.as_secs_f64()
    );

    println!();
    println!("Verifying FTS index...");
    let hits = db.stock().search("filtro", 10).await?;
    println!("  Search 'filtro': {} results", hits.len());

    let hits = db.stock().search("rolamento", 10).await?;
    println!("  Search 'rolamento': {} results", hits.len());

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single item with realistic data. The `seed` index keeps
/// part codes unique across repeated family passes.
fn generate_item(family: &str, description: &str, seed: usize) -> NewStockItem {
    let manufacturer = MANUFACTURERS[seed % MANUFACTURERS.len()];

    // Part code: family prefix + running index
    let prefix: String = family.chars().take(3).collect::<String>().to_uppercase();
    let part_code = format!("{}-{:04}", prefix, seed);

    // Opening stock 0-40, threshold 0-9, cost R$ 1,99 - R$ 201,99
    let opening_quantity = (seed % 41) as i64;
    let min_stock = (seed % 10) as i64;
    let unit_cost = Money::from_cents(199 + ((seed * 37) % 20000) as i64);

    let mut item = NewStockItem::new(format!("{} {}", description, seed), "seed");
    item.classification = Some(family.to_string());
    item.manufacturer = Some(manufacturer.to_string());
    item.part_code = Some(part_code);
    item.application = Some("uso geral de manutenção".to_string());
    item.min_stock = min_stock;
    item.opening_quantity = opening_quantity;
    item.opening_unit_cost = unit_cost;
    item
}
