use anyhow::{Context, Result};
use rusqlite::Connection;
use std::env;
use std::path::Path;

use pali_families::{
    insert_headwords, load_headwords_csv, run_compound_families, run_family_sets,
    setup_database, today, Config, PaliCollator, RunReport,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = Config::load()?;

    if args.len() > 2 && args[1] == "import" {
        // Import mode
        run_import(&config, Path::new(&args[2]))?;
    } else {
        // Rebuild mode (default)
        run_all(&config)?;
    }

    Ok(())
}

fn run_import(config: &Config, csv_path: &Path) -> Result<()> {
    println!("🗄️  Headword import - CSV → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading CSV...");
    let records = load_headwords_csv(csv_path)
        .with_context(|| format!("Failed to load headwords from {:?}", csv_path))?;
    println!("✓ Loaded {} headwords from CSV", records.len());

    println!("\n🔧 Setting up database...");
    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database {:?}", config.db_path))?;
    setup_database(&conn)?;

    println!("\n💾 Inserting headwords...");
    let inserted = insert_headwords(&conn, &records)?;
    println!("✓ Inserted {} headwords ({} already present)", inserted, records.len() - inserted);

    Ok(())
}

fn run_all(config: &Config) -> Result<()> {
    let mut conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database {:?}", config.db_path))?;
    setup_database(&conn)?;

    println!("🧩 Compound families generator");
    let report = run_compound_families(&mut conn, config, &PaliCollator, &today())?;
    print_report(&report);

    println!("\n🌿 Sets generator");
    let report = run_family_sets(&mut conn, config, &PaliCollator, &today())?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("✓ {}", report.summary());

    if report.has_warnings() {
        println!("⚠️  Warnings:");
        for warning in &report.warnings {
            println!("   {}", warning.message());
        }
    }
}
