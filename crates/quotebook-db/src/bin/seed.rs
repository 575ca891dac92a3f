//! # Seed Data Generator
//!
//! Populates the database with sample quotes and projects for development.
//! Every document goes through the coordinator, so numbers, totals and
//! status timestamps are produced exactly as in production.
//!
//! ## Usage
//! ```bash
//! # 40 quotes and 10 projects (default)
//! cargo run -p quotebook-db --bin seed
//!
//! # Custom amount
//! cargo run -p quotebook-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p quotebook-db --bin seed -- --db ./data/quotebook.db
//!
//! # More logging
//! RUST_LOG=quotebook_db=debug cargo run -p quotebook-db --bin seed
//! ```
//!
//! Prefixes and the default tax rate come from the `QUOTEBOOK_*`
//! environment variables (see `CoordinatorConfig`).

use std::env;

use chrono::{Datelike, Utc};
use quotebook_core::{DocumentKind, DocumentStatus, NewDocument, NewLineItem};
use quotebook_db::{CoordinatorConfig, Database, DbConfig, DocumentCoordinator};
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Job titles, one picked per document.
const TITLES: &[&str] = &[
    "Remplacement fenêtres",
    "Véranda alu",
    "Pergola bioclimatique",
    "Porte d'entrée",
    "Volets roulants",
    "Portail coulissant",
    "Garde-corps terrasse",
    "Baie vitrée",
    "Store banne",
    "Clôture jardin",
];

/// Priced catalogue rows: (description, unit, price in cents).
const CATALOGUE: &[(&str, &str, i64)] = &[
    ("Fenêtre PVC 2 vantaux", "u", 42_000),
    ("Baie coulissante alu", "u", 189_000),
    ("Volet roulant motorisé", "u", 61_500),
    ("Porte d'entrée acier", "u", 235_000),
    ("Profilé aluminium", "ml", 3_850),
    ("Vitrage feuilleté", "m2", 12_900),
    ("Dépose de l'existant", "forfait", 25_000),
    ("Pose et réglages", "forfait", 45_000),
    ("Déplacement", "forfait", 6_000),
    ("Remise fidélité", "forfait", -10_000),
];

/// Status paths applied to seeded documents, in rotation.
const PATHS: &[&[DocumentStatus]] = &[
    &[],
    &[DocumentStatus::Sent],
    &[DocumentStatus::Sent, DocumentStatus::Negotiating],
    &[DocumentStatus::Sent, DocumentStatus::Validated],
    &[DocumentStatus::Sent, DocumentStatus::Rejected],
    &[DocumentStatus::Sent, DocumentStatus::Expired],
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Quotebook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of documents to create (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: $QUOTEBOOK_DATABASE_PATH)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let db = Database::new(db_config).await?;
    let coordinator = db.coordinator(CoordinatorConfig::load()?);

    let existing = db.documents().list(None, None).await?.len();
    if existing > 0 {
        warn!(existing, "Database already has documents, skipping seed");
        return Ok(());
    }

    let author = Uuid::new_v4().to_string();
    let start = std::time::Instant::now();
    let mut created = 0;

    for seed in 0..count {
        // One project for every four quotes.
        let kind = if seed % 5 == 4 {
            DocumentKind::Project
        } else {
            DocumentKind::Quote
        };

        match seed_document(&coordinator, kind, seed, &author).await {
            Ok(()) => created += 1,
            Err(e) => warn!(seed, error = %e, "Failed to seed document"),
        }
    }

    info!(created, elapsed = ?start.elapsed(), "Seed complete");

    let year = Utc::now().year();
    for kind in [DocumentKind::Quote, DocumentKind::Project] {
        for row in db.documents().summary_by_status(kind, year).await? {
            if row.count > 0 {
                info!(
                    kind = kind.as_str(),
                    status = ?row.status,
                    count = row.count,
                    grand_total = %row.grand_total,
                    "Summary"
                );
            }
        }
    }

    db.close().await;
    Ok(())
}

/// Creates one document and walks it along a status path.
async fn seed_document(
    coordinator: &DocumentCoordinator,
    kind: DocumentKind,
    seed: usize,
    author: &str,
) -> Result<(), quotebook_db::DocumentError> {
    let title = format!("{} #{}", TITLES[seed % TITLES.len()], seed + 1);
    let lines = generate_lines(seed);

    let mut request = NewDocument::new(kind, title, author).with_lines(lines);
    // Renovation work is taxed at the reduced rate.
    if seed % 3 == 0 {
        request = request.with_tax_rate(Decimal::new(10, 0));
    }

    let doc = coordinator.create(request).await?;

    for &status in PATHS[seed % PATHS.len()] {
        coordinator.transition_status(&doc.id, status, author).await?;
    }

    Ok(())
}

/// Picks 1 to 6 catalogue rows with varying quantities.
fn generate_lines(seed: usize) -> Vec<NewLineItem> {
    let n = 1 + seed % 6;

    (0..n)
        .map(|i| {
            let (description, unit, cents) = CATALOGUE[(seed * 7 + i * 3) % CATALOGUE.len()];
            let quantity = match unit {
                "ml" | "m2" => Decimal::new(((seed + i) % 40 + 5) as i64 * 5, 1),
                _ => Decimal::from(((seed + i) % 4 + 1) as i64),
            };
            NewLineItem::new(description, quantity, unit, Decimal::new(cents, 2))
        })
        .collect()
}
