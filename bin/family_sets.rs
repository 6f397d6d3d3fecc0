// Sets generator: rebuild all sets, report sets with too few names

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::time::Instant;

use pali_families::{run_family_sets, setup_database, today, Config, PaliCollator, RunWarning};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let started = Instant::now();
    println!("🌿 Sets generator");

    let config = Config::load()?;
    let mut conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database {:?}", config.db_path))?;
    setup_database(&conn)?;

    let report = run_family_sets(&mut conn, &config, &PaliCollator, &today())?;
    println!("✓ {}", report.summary());

    let small: Vec<&RunWarning> = report
        .warnings
        .iter()
        .filter(|w| matches!(w, RunWarning::UnderpopulatedSet { .. }))
        .collect();

    if !small.is_empty() {
        println!("❌ Sets with less than {} names:", config.min_set_members);
        for warning in small {
            println!("   {}", warning.message());
        }
    }
    println!("⏱️  {:.2?}", started.elapsed());

    Ok(())
}
