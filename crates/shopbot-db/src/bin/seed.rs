//! # Seed Data Generator
//!
//! Populates a development database with a small sample catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./shopbot_dev.db
//! cargo run -p shopbot-db --bin seed
//!
//! # Specify database path
//! cargo run -p shopbot-db --bin seed -- --db ./data/shop.db
//! ```
//!
//! ## Generated Data
//! - Three countries with display names and flag emojis
//! - A handful of products per (country, category)
//! - "no product" placeholders for every pair left empty
//! - Default QR code URL and thank-you message written out explicitly

use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shopbot_core::ProductDraft;
use shopbot_db::{Database, DbConfig};

/// (code, display name, flag)
const COUNTRIES: &[(&str, &str, &str)] = &[
    ("th", "Thailand", "🇹🇭"),
    ("jp", "Japan", "🇯🇵"),
    ("kr", "Korea", "🇰🇷"),
];

const CATEGORIES: &[&str] = &["weapon", "money", "item"];

/// (name, base price, emoji, category)
const PRODUCTS: &[(&str, f64, &str, &str)] = &[
    ("Sword", 100.0, "🗡️", "weapon"),
    ("Bow", 80.0, "🏹", "weapon"),
    ("Shield", 65.5, "🛡️", "weapon"),
    ("Gold 1K", 10.0, "💰", "money"),
    ("Gold 10K", 90.0, "💰", "money"),
    ("Potion", 5.0, "🧪", "item"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./shopbot_dev.db");

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
                println!("Shopbot Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./shopbot_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shopbot Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");

    let existing = db.products().count(None, None).await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Countries
    let countries = db.countries();
    for (code, name, flag) in COUNTRIES {
        if let Err(e) = countries.add(code, name, Some(*flag)).await {
            warn!(code = %code, error = %e, "Skipping country");
        }
    }
    println!("✓ Registered {} countries", COUNTRIES.len());

    // Products: Korea is left empty so it only receives placeholders
    let drafts: Vec<ProductDraft> = COUNTRIES
        .iter()
        .filter(|(code, _, _)| *code != "kr")
        .enumerate()
        .flat_map(|(idx, (code, _, _))| {
            PRODUCTS.iter().map(move |(name, price, emoji, category)| ProductDraft {
                name: Some((*name).to_string()),
                price: Some(price * (1.0 + idx as f64 * 0.25)),
                emoji: Some((*emoji).to_string()),
                country: Some((*code).to_string()),
                category: Some((*category).to_string()),
            })
        })
        .collect();

    let added = db.products().batch_add(&drafts).await?;
    println!("✓ Added {} products", added);

    let codes: Vec<&str> = COUNTRIES.iter().map(|(code, _, _)| *code).collect();
    let placeholders = db.products().add_placeholders(&codes[..], CATEGORIES).await?;
    println!("✓ Added {} placeholders", placeholders);

    // Settings
    let settings = db.settings();
    let qrcode_url = settings.qrcode_url().await?;
    settings.save_qrcode_url(&qrcode_url).await?;
    let thank_you = settings.thank_you_message().await?;
    settings.save_thank_you_message(&thank_you).await?;
    println!("✓ Stored default settings");

    // Verify
    println!();
    for code in codes.iter().copied() {
        let listed = db.products().count(Some(code), None).await?;
        println!("  {}: {} products", code, listed);
    }

    info!(products = added, placeholders, "Seed complete");
    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopbot=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
