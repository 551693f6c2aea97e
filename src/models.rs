use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::pricing::PaymentOptions;

// ============ Database Models ============

/// A scored applicant as persisted in the `applicants` table.
///
/// Records are created once, on the first scoring request for a given SSN,
/// and never updated afterwards.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Applicant {
    /// Auto-assigned identifier.
    pub id: i64,
    /// Full name, trimmed.
    pub name: String,
    /// National identifier, digits only. Unique across the table.
    pub ssn: String,
    /// Months employed over the last ten years (0-120).
    pub employment_months: i32,
    /// Monthly incoming cash.
    pub incoming_cash: f64,
    /// Monthly outgoing cash.
    pub outgoing_cash: f64,
    /// On-time payments in the trailing 24 months (0-24).
    pub on_time_payments: i32,
    /// Credit score in [300, 800].
    pub score: f64,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
}

impl Applicant {
    /// The raw attributes the score was derived from.
    pub fn features(&self) -> ApplicantFeatures {
        ApplicantFeatures {
            employment_months: self.employment_months,
            incoming_cash: self.incoming_cash,
            outgoing_cash: self.outgoing_cash,
            on_time_payments: self.on_time_payments,
        }
    }
}

/// Insert payload for a new applicant; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplicant {
    pub name: String,
    pub ssn: String,
    pub features: ApplicantFeatures,
    pub score: f64,
}

/// The four raw financial attributes that feed the score engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicantFeatures {
    pub employment_months: i32,
    pub incoming_cash: f64,
    pub outgoing_cash: f64,
    pub on_time_payments: i32,
}

impl ApplicantFeatures {
    /// Features in model schema order.
    pub fn as_array(&self) -> [f64; 4] {
        [
            f64::from(self.employment_months),
            self.incoming_cash,
            self.outgoing_cash,
            f64::from(self.on_time_payments),
        ]
    }
}

// ============ API Request Models ============

/// Body of `POST /api/v1/calc_score`.
///
/// Identity is either `id` alone or both `name` and `ssn`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CalcScoreRequest {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub ssn: Option<String>,
    pub item_price: Option<f64>,
}

/// Query parameters of `GET /api/v1/users/lookup`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserLookupParams {
    pub name: Option<String>,
    pub ssn: Option<String>,
}

/// Validated identity of a scoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicantIdentity {
    ById(i64),
    ByNameAndSsn { name: String, ssn: String },
}

// ============ API Response Models ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalcScoreResponse {
    pub message: String,
    pub user: Applicant,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub interest_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_options: Option<PaymentOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: Applicant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub count: usize,
    pub users: Vec<Applicant>,
}
