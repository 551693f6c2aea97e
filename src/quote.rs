/// Score-and-quote workflow shared by the HTTP handlers
///
/// 1. Validate identity and price (no side effects on failure)
/// 2. Read the applicant through the store, creating it on first sight
/// 3. Map the stored score to an interest rate
/// 4. Build the installment plans for the requested price
use std::sync::Arc;

use crate::errors::AppError;
use crate::features::{synthesize_features, FeatureRanges};
use crate::handlers::AppState;
use crate::models::{
    Applicant, ApplicantIdentity, CalcScoreRequest, CalcScoreResponse, NewApplicant,
};
use crate::pricing::{build_payment_options, interest_rate_for_score, PaymentOptions};
use crate::scoring::ScoringStrategy;
use crate::store::ApplicantStore;
use crate::validation::{mask_ssn, normalize_ssn, resolve_identity, validate_name, validate_price};

pub const MESSAGE_CREATED: &str = "Score calculated";
pub const MESSAGE_EXISTING: &str = "Existing score returned";

/// Interest-rate descriptor plus plans for a score and price.
pub fn quote(score: f64, price: f64) -> Result<PaymentOptions, AppError> {
    let rate = interest_rate_for_score(score)?;
    Ok(build_payment_options(price, &rate)?)
}

pub struct QuoteService {
    store: Arc<dyn ApplicantStore>,
    strategy: ScoringStrategy,
    feature_ranges: FeatureRanges,
}

impl QuoteService {
    pub fn new(
        store: Arc<dyn ApplicantStore>,
        strategy: ScoringStrategy,
        feature_ranges: FeatureRanges,
    ) -> Self {
        Self {
            store,
            strategy,
            feature_ranges,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.store.clone(),
            state.scoring.clone(),
            state.feature_ranges,
        )
    }

    /// Handle a score request: look up or create the applicant, then quote.
    pub async fn calculate(&self, request: &CalcScoreRequest) -> Result<CalcScoreResponse, AppError> {
        let identity = resolve_identity(request)?;
        let price = validate_price(request.item_price)?;

        let (applicant, created) = match identity {
            ApplicantIdentity::ById(id) => (self.get(id).await?, false),
            ApplicantIdentity::ByNameAndSsn { name, ssn } => {
                self.find_or_create(&name, &ssn).await?
            }
        };

        let payment_options = price
            .map(|p| quote(applicant.score, p))
            .transpose()?;

        Ok(CalcScoreResponse {
            message: if created { MESSAGE_CREATED } else { MESSAGE_EXISTING }.to_string(),
            interest_rate: payment_options.as_ref().map(|o| o.interest_rate.clone()),
            payment_options,
            user: applicant,
        })
    }

    /// Return the stored applicant for `ssn`, or score and persist a new one.
    ///
    /// The boolean is true when this call created the record. Expects a
    /// validated name and normalized SSN.
    pub async fn find_or_create(&self, name: &str, ssn: &str) -> Result<(Applicant, bool), AppError> {
        if let Some(existing) = self.store.find_by_ssn(ssn).await? {
            tracing::debug!("Applicant {} found for {}", existing.id, mask_ssn(ssn));
            return Self::check_name(existing, name).map(|a| (a, false));
        }

        let new_applicant = self.score_new_applicant(name, ssn);

        match self.store.insert(new_applicant).await {
            Ok(applicant) => {
                tracing::info!(
                    "Created applicant {} ({}) with score {:.2} [{}]",
                    applicant.id,
                    mask_ssn(ssn),
                    applicant.score,
                    self.strategy.name()
                );
                Ok((applicant, true))
            }
            Err(e) if e.is_conflict() => {
                // Another request created this SSN first; use its record.
                tracing::info!("Lost insert race for {}, re-reading", mask_ssn(ssn));
                let existing = self.store.find_by_ssn(ssn).await?.ok_or(e)?;
                Self::check_name(existing, name).map(|a| (a, false))
            }
            Err(e) => Err(e),
        }
    }

    fn score_new_applicant(&self, name: &str, ssn: &str) -> NewApplicant {
        let features = synthesize_features(&mut rand::thread_rng(), &self.feature_ranges);
        let score = self.strategy.score(&features);

        NewApplicant {
            name: name.to_string(),
            ssn: ssn.to_string(),
            features,
            score,
        }
    }

    fn check_name(existing: Applicant, name: &str) -> Result<Applicant, AppError> {
        if existing.name == name {
            Ok(existing)
        } else {
            Err(AppError::Conflict(format!(
                "SSN {} is registered under a different name",
                mask_ssn(&existing.ssn)
            )))
        }
    }

    /// Lookup by name and SSN; both must match.
    pub async fn lookup(&self, name: &str, ssn: &str) -> Result<Applicant, AppError> {
        let name = validate_name(name)?;
        let ssn = normalize_ssn(ssn)?;

        let existing = self
            .store
            .find_by_ssn(&ssn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Self::check_name(existing, &name)
    }

    pub async fn get(&self, id: i64) -> Result<Applicant, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<Applicant>, AppError> {
        self.store.list_all().await
    }
}
