use std::env;

use chrono::Utc;
use credit_quote_api::db::Database;
use credit_quote_api::db_storage::PgApplicantStore;
use credit_quote_api::models::{ApplicantFeatures, NewApplicant};
use credit_quote_api::store::ApplicantStore;

/// Integration smoke test for the PostgreSQL applicant store.
/// Marked ignored so it never runs against a shared database by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn applicant_store_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url, 2).await?;
    db.ensure_schema().await?;
    let store = PgApplicantStore::new(db.pool.clone());

    // Unique SSN per run to avoid collisions with earlier runs.
    let ssn = format!("{:09}", Utc::now().timestamp_micros().rem_euclid(1_000_000_000));
    let new_applicant = |name: &str| NewApplicant {
        name: name.to_string(),
        ssn: ssn.clone(),
        features: ApplicantFeatures {
            employment_months: 60,
            incoming_cash: 3000.0,
            outgoing_cash: 1000.0,
            on_time_payments: 12,
        },
        score: 535.0,
    };

    let stored = store.insert(new_applicant("Smoke Test")).await?;
    assert_eq!(stored.ssn, ssn);
    assert_eq!(stored.score, 535.0);

    assert_eq!(store.find_by_id(stored.id).await?, Some(stored.clone()));
    assert_eq!(store.find_by_ssn(&ssn).await?, Some(stored.clone()));

    let err = store
        .insert(new_applicant("Someone Else"))
        .await
        .expect_err("duplicate SSN must be rejected");
    assert!(err.is_conflict());

    let all = store.list_all().await?;
    assert!(all.iter().any(|a| a.id == stored.id));

    // Clean up so repeated runs stay tidy.
    sqlx::query("DELETE FROM applicants WHERE ssn = $1")
        .bind(&ssn)
        .execute(&db.pool)
        .await?;

    Ok(())
}
