//! Utility to inspect the applicants table: columns and a score summary.

use anyhow::Context;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new().connect(&database_url).await?;

    let columns: Vec<(String, String)> = sqlx::query_as(
        "SELECT column_name, data_type FROM information_schema.columns WHERE table_name = 'applicants' ORDER BY ordinal_position"
    )
    .fetch_all(&pool)
    .await?;

    if columns.is_empty() {
        println!("Table 'applicants' not found. Start the API once to create it.");
        return Ok(());
    }

    println!("applicants:");
    for (col, type_) in columns {
        println!("  - {}: {}", col, type_);
    }

    let (count, min, max, avg): (i64, Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
        "SELECT COUNT(*), MIN(score), MAX(score), AVG(score) FROM applicants",
    )
    .fetch_one(&pool)
    .await?;

    println!();
    println!("rows: {}", count);
    if let (Some(min), Some(max), Some(avg)) = (min, max, avg) {
        println!("score min/avg/max: {:.2} / {:.2} / {:.2}", min, avg, max);
    }

    Ok(())
}
