//! # Seed Data Generator
//!
//! Populates the database with a small salon catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./till.db
//! cargo run -p till-db --bin seed
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```
//!
//! ## Generated Data
//! - Articles across categories, each with an opening stock
//! - Services with recipes linking the articles they consume

use std::env;
use till_core::{Money, NewArticle, NewService, DEFAULT_CATEGORY};
use till_db::Database;

/// (category, [(name, price in cents, opening stock)])
const ARTICLES: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "cabelo",
        &[
            ("Shampoo", 1250, 24),
            ("Condicionador", 1390, 18),
            ("Máscara capilar", 2190, 10),
            ("Tinta castanho", 890, 30),
            ("Oxidante 20 vol", 450, 30),
        ],
    ),
    (
        "unhas",
        &[
            ("Verniz vermelho", 650, 15),
            ("Verniz nude", 650, 15),
            ("Acetona", 320, 12),
            ("Algodão", 180, 40),
            ("Lima", 120, 50),
        ],
    ),
    (
        DEFAULT_CATEGORY,
        &[("Toalha descartável", 90, 200), ("Luvas", 60, 300)],
    ),
];

/// (name, price in cents, category, [recipe article names])
const SERVICES: &[(&str, i64, &str, &[&str])] = &[
    ("Corte", 1500, "cabelo", &["Toalha descartável"]),
    (
        "Coloração",
        3500,
        "cabelo",
        &["Tinta castanho", "Oxidante 20 vol", "Luvas"],
    ),
    (
        "Manicure",
        1200,
        "unhas",
        &["Verniz vermelho", "Acetona", "Algodão", "Lima"],
    ),
    ("Consulta", 0, DEFAULT_CATEGORY, &[]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./till.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./till.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::open(&db_path).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.articles().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} articles", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating articles...");

    let mut article_ids: Vec<(&str, i64)> = Vec::new();
    for (category, articles) in ARTICLES {
        for (name, price, quantity) in articles.iter() {
            let article = NewArticle {
                name: name.to_string(),
                price: Money::from_cents(*price),
                quantity: *quantity,
                category: Some(category.to_string()),
            };

            match db.articles().insert(&article, DEFAULT_CATEGORY).await {
                Ok(created) => article_ids.push((name, created.id)),
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }
    println!("  {} articles", article_ids.len());

    println!("Creating services...");

    let mut services = 0;
    for (name, price, category, recipe) in SERVICES {
        let service = NewService {
            name: name.to_string(),
            price: Money::from_cents(*price),
            category: Some(category.to_string()),
        };

        let created = match db.services().insert(&service, DEFAULT_CATEGORY).await {
            Ok(created) => created,
            Err(e) => {
                eprintln!("Failed to insert {}: {}", name, e);
                continue;
            }
        };
        services += 1;

        for article_name in recipe.iter() {
            let Some((_, article_id)) = article_ids.iter().find(|(n, _)| n == article_name) else {
                eprintln!("  Recipe article {} missing for {}", article_name, name);
                continue;
            };
            db.services().link_article(created.id, *article_id).await?;
        }
        println!("  {} ({} recipe articles)", name, recipe.len());
    }

    println!();
    println!("✓ Seeded {} articles and {} services", article_ids.len(), services);

    db.close().await;
    Ok(())
}
