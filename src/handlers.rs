use crate::config::Config;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::features::FeatureRanges;
use crate::models::*;
use crate::quote::QuoteService;
use crate::scoring::ScoringStrategy;
use crate::store::ApplicantStore;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Built once in `main` and torn down with the server.
#[derive(Clone)]
pub struct AppState {
    /// Applicant records (PostgreSQL or in-memory).
    pub store: Arc<dyn ApplicantStore>,
    /// Application configuration.
    pub config: Config,
    /// Score engine selected at startup.
    pub scoring: ScoringStrategy,
    /// Ranges new applicants' attributes are sampled from.
    pub feature_ranges: FeatureRanges,
}

impl AppState {
    pub fn new(store: Arc<dyn ApplicantStore>, config: Config, scoring: ScoringStrategy) -> Self {
        let feature_ranges = scoring.feature_ranges();
        Self {
            store,
            config,
            scoring,
            feature_ranges,
        }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, store backend and active scoring
/// strategy.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "store_backend": state.config.store_backend.as_str(),
            "scoring_strategy": state.scoring.name(),
        })),
    )
}

/// POST /api/v1/calc_score
///
/// Scores a new applicant (or returns the stored score for a known SSN) and
/// quotes installment plans when `item_price` is given.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - Identity (`name` + `ssn`, or `id`) and optional `item_price`.
///
/// # Returns
///
/// * `Result<Json<CalcScoreResponse>, AppError>` - The applicant and quote, or an error.
pub async fn calc_score(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CalcScoreRequest>,
) -> Result<Json<CalcScoreResponse>, AppError> {
    tracing::info!(
        "POST /calc_score - id: {:?}, price: {:?}",
        payload.id,
        payload.item_price
    );

    let service = QuoteService::from_state(&state);
    let response = service.calculate(&payload).await?;

    tracing::info!(
        "Applicant {} scored {:.2} ({})",
        response.user.id,
        response.user.score,
        response.message
    );

    Ok(Json(response))
}

/// GET /api/v1/users/lookup?name=&ssn=
///
/// Returns the stored applicant when both name and SSN match. Never creates
/// a record.
pub async fn lookup_user(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<UserLookupParams>,
) -> Result<Json<UserResponse>, AppError> {
    let (name, ssn) = match (params.name.as_deref(), params.ssn.as_deref()) {
        (Some(name), Some(ssn)) => (name, ssn),
        _ => {
            return Err(AppError::BadRequest(
                "Name and SSN are required".to_string(),
            ))
        }
    };

    let user = QuoteService::from_state(&state).lookup(name, ssn).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /api/v1/users/:id
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserResponse>, AppError> {
    tracing::info!("GET /users/{}", id);

    let user = QuoteService::from_state(&state).get(id).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = QuoteService::from_state(&state).list().await?;
    tracing::debug!("Listing {} applicants", users.len());

    Ok(Json(UserListResponse {
        count: users.len(),
        users,
    }))
}
