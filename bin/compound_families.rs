// Compound families generator: rebuild all compound families and their html

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::time::Instant;

use pali_families::{run_compound_families, setup_database, today, Config, PaliCollator};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let started = Instant::now();
    println!("🧩 Compound families generator");

    let config = Config::load()?;
    let mut conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database {:?}", config.db_path))?;
    setup_database(&conn)?;

    let report = run_compound_families(&mut conn, &config, &PaliCollator, &today())?;

    println!("✓ {}", report.summary());
    for warning in &report.warnings {
        println!("⚠️  {}", warning.message());
    }
    println!("⏱️  {:.2?}", started.elapsed());

    Ok(())
}
