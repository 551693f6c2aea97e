use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::{AppError, ResultExt};
use crate::models::{Applicant, ApplicantFeatures, NewApplicant};
use crate::store::{duplicate_ssn, ApplicantStore};
use crate::validation::mask_ssn;

pub const APPLICANTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS applicants (
    id                BIGSERIAL PRIMARY KEY,
    name              TEXT NOT NULL CHECK (length(btrim(name)) > 0),
    ssn               TEXT NOT NULL UNIQUE,
    employment_months INTEGER NOT NULL CHECK (employment_months BETWEEN 0 AND 120),
    incoming_cash     DOUBLE PRECISION NOT NULL CHECK (incoming_cash >= 0),
    outgoing_cash     DOUBLE PRECISION NOT NULL CHECK (outgoing_cash >= 0),
    on_time_payments  INTEGER NOT NULL CHECK (on_time_payments BETWEEN 0 AND 24),
    score             DOUBLE PRECISION NOT NULL,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const APPLICANT_COLUMNS: &str = "id, name, ssn, employment_months, incoming_cash, \
     outgoing_cash, on_time_payments, score, created_at";

/// PostgreSQL-backed applicant store.
///
/// Uniqueness of the SSN is enforced by the table constraint, so two racing
/// inserts for the same SSN produce exactly one row.
pub struct PgApplicantStore {
    pool: PgPool,
}

impl PgApplicantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicantStore for PgApplicantStore {
    async fn find_by_ssn(&self, ssn: &str) -> Result<Option<Applicant>, AppError> {
        sqlx::query_as::<_, Applicant>(&format!(
            "SELECT {} FROM applicants WHERE ssn = $1",
            APPLICANT_COLUMNS
        ))
        .bind(ssn)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Looking up applicant by SSN {}", mask_ssn(ssn)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Applicant>, AppError> {
        sqlx::query_as::<_, Applicant>(&format!(
            "SELECT {} FROM applicants WHERE id = $1",
            APPLICANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Looking up applicant {}", id))
    }

    async fn insert(&self, applicant: NewApplicant) -> Result<Applicant, AppError> {
        // ON CONFLICT DO NOTHING returns no row when the SSN is taken
        let inserted = sqlx::query_as::<_, Applicant>(&format!(
            r#"
            INSERT INTO applicants
                (name, ssn, employment_months, incoming_cash, outgoing_cash, on_time_payments, score)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (ssn) DO NOTHING
            RETURNING {}
            "#,
            APPLICANT_COLUMNS
        ))
        .bind(&applicant.name)
        .bind(&applicant.ssn)
        .bind(applicant.features.employment_months)
        .bind(applicant.features.incoming_cash)
        .bind(applicant.features.outgoing_cash)
        .bind(applicant.features.on_time_payments)
        .bind(applicant.score)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Inserting applicant with SSN {}", mask_ssn(&applicant.ssn)))?;

        match inserted {
            Some(row) => {
                tracing::debug!("Inserted applicant {} ({})", row.id, mask_ssn(&row.ssn));
                Ok(row)
            }
            None => Err(duplicate_ssn(&applicant.ssn)),
        }
    }

    async fn list_all(&self) -> Result<Vec<Applicant>, AppError> {
        sqlx::query_as::<_, Applicant>(&format!(
            "SELECT {} FROM applicants ORDER BY id",
            APPLICANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Listing applicants")
    }

    async fn training_rows(&self) -> Result<Vec<(ApplicantFeatures, f64)>, AppError> {
        let rows: Vec<(i32, f64, f64, i32, f64)> = sqlx::query_as(
            "SELECT employment_months, incoming_cash, outgoing_cash, on_time_payments, score \
             FROM applicants ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Loading training rows")?;

        Ok(rows
            .into_iter()
            .map(
                |(employment_months, incoming_cash, outgoing_cash, on_time_payments, score)| {
                    (
                        ApplicantFeatures {
                            employment_months,
                            incoming_cash,
                            outgoing_cash,
                            on_time_payments,
                        },
                        score,
                    )
                },
            )
            .collect())
    }
}
