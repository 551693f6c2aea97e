//! Applicant store contract and the in-memory implementation.
//!
//! The PostgreSQL implementation lives in `db_storage`.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{Applicant, ApplicantFeatures, NewApplicant};
use crate::validation::mask_ssn;

/// Single-table applicant store keyed by SSN.
///
/// `insert` must fail with [`AppError::Conflict`] when the SSN already
/// exists; callers rely on that to resolve racing creations.
#[async_trait]
pub trait ApplicantStore: Send + Sync {
    async fn find_by_ssn(&self, ssn: &str) -> Result<Option<Applicant>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Applicant>, AppError>;

    async fn insert(&self, applicant: NewApplicant) -> Result<Applicant, AppError>;

    /// All records, ordered by id.
    async fn list_all(&self) -> Result<Vec<Applicant>, AppError>;

    /// (features, score) pairs for fitting the learned model.
    async fn training_rows(&self) -> Result<Vec<(ApplicantFeatures, f64)>, AppError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .map(|a| (a.features(), a.score))
            .collect())
    }
}

pub(crate) fn duplicate_ssn(ssn: &str) -> AppError {
    AppError::Conflict(format!(
        "An applicant with SSN {} already exists",
        mask_ssn(ssn)
    ))
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryApplicantStore {
    applicants: RwLock<Vec<Applicant>>,
}

impl InMemoryApplicantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicantStore for InMemoryApplicantStore {
    async fn find_by_ssn(&self, ssn: &str) -> Result<Option<Applicant>, AppError> {
        let applicants = self.applicants.read().await;
        Ok(applicants.iter().find(|a| a.ssn == ssn).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Applicant>, AppError> {
        let applicants = self.applicants.read().await;
        Ok(applicants.iter().find(|a| a.id == id).cloned())
    }

    async fn insert(&self, applicant: NewApplicant) -> Result<Applicant, AppError> {
        let mut applicants = self.applicants.write().await;
        if applicants.iter().any(|a| a.ssn == applicant.ssn) {
            return Err(duplicate_ssn(&applicant.ssn));
        }

        let id = applicants.last().map_or(1, |a| a.id + 1);
        let stored = Applicant {
            id,
            name: applicant.name,
            ssn: applicant.ssn,
            employment_months: applicant.features.employment_months,
            incoming_cash: applicant.features.incoming_cash,
            outgoing_cash: applicant.features.outgoing_cash,
            on_time_payments: applicant.features.on_time_payments,
            score: applicant.score,
            created_at: Utc::now(),
        };
        applicants.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Applicant>, AppError> {
        Ok(self.applicants.read().await.clone())
    }
}
