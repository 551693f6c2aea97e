//! Fits the learned scoring model from the persisted applicants table.
//!
//! Reads `DATABASE_URL`, writes the artifact to `MODEL_PATH`
//! (default `credit_score_model.json`).

use anyhow::Context;
use credit_quote_api::db::Database;
use credit_quote_api::db_storage::PgApplicantStore;
use credit_quote_api::model::ModelArtifact;
use credit_quote_api::store::ApplicantStore;
use credit_quote_api::training::{train, SPLIT_SEED};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("DB_URL"))
        .context("DATABASE_URL must be set")?;
    let model_path = env::var("MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("credit_score_model.json"));

    let db = Database::new(&database_url, 2).await?;
    let store = PgApplicantStore::new(db.pool.clone());

    let rows = store.training_rows().await?;
    tracing::info!("Loaded {} applicants for training", rows.len());

    let report = train(&rows, SPLIT_SEED)?;
    tracing::info!(
        "Fitted on {} rows, held out {}. RMSE train: {:.3}, test: {:.3}",
        report.train_rows,
        report.test_rows,
        report.train_rmse,
        report.test_rmse
    );
    tracing::debug!(
        "Intercept {:.6}, coefficients {:?}",
        report.model.intercept,
        report.model.coefficients
    );

    tracing::info!("Observed feature ranges: {:?}", report.feature_ranges);

    let artifact = ModelArtifact::new(report.model, report.feature_ranges, report.train_rows);
    artifact.save(&model_path)?;
    tracing::info!("Model saved as {}", model_path.display());

    Ok(())
}
