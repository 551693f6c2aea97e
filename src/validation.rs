/// Request validation for the scoring endpoints
///
/// Everything here runs before any store access, so a rejected request never
/// has side effects.
use regex::Regex;
use std::sync::OnceLock;

use crate::errors::AppError;
use crate::models::{ApplicantIdentity, CalcScoreRequest};

pub const MAX_NAME_LEN: usize = 200;
/// Largest accepted `item_price`.
pub const MAX_ITEM_PRICE: f64 = 1_000_000_000.0;

fn ssn_regex() -> &'static Regex {
    static SSN_REGEX: OnceLock<Regex> = OnceLock::new();
    SSN_REGEX.get_or_init(|| {
        Regex::new(r"^\d{3}-?\d{2}-?\d{4}$").expect("SSN pattern is a valid regex")
    })
}

/// Validate an SSN and normalize it to its nine digits.
///
/// Accepts `123-45-6789` and `123456789` (surrounding whitespace ignored).
pub fn normalize_ssn(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("SSN is required".to_string()));
    }
    if !ssn_regex().is_match(trimmed) {
        return Err(AppError::BadRequest(
            "SSN must have the form 123-45-6789 or 123456789".to_string(),
        ));
    }
    Ok(trimmed.chars().filter(|c| c.is_ascii_digit()).collect())
}

/// Trim a name and reject blank or oversized ones.
pub fn validate_name(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_price(price: Option<f64>) -> Result<Option<f64>, AppError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(AppError::BadRequest(format!(
            "item_price must be a non-negative number, got {}",
            p
        ))),
        Some(p) if p > MAX_ITEM_PRICE => Err(AppError::BadRequest(format!(
            "item_price must be at most {}, got {}",
            MAX_ITEM_PRICE, p
        ))),
        other => Ok(other),
    }
}

/// Work out who a scoring request is about.
///
/// `id` wins when present; otherwise both `name` and `ssn` are required.
pub fn resolve_identity(request: &CalcScoreRequest) -> Result<ApplicantIdentity, AppError> {
    if let Some(id) = request.id {
        if id <= 0 {
            return Err(AppError::BadRequest(format!(
                "id must be a positive integer, got {}",
                id
            )));
        }
        return Ok(ApplicantIdentity::ById(id));
    }

    match (request.name.as_deref(), request.ssn.as_deref()) {
        (Some(name), Some(ssn)) => Ok(ApplicantIdentity::ByNameAndSsn {
            name: validate_name(name)?,
            ssn: normalize_ssn(ssn)?,
        }),
        _ => Err(AppError::BadRequest(
            "Name and SSN are required".to_string(),
        )),
    }
}

/// `123456789` -> `***-**-6789` for log lines.
pub fn mask_ssn(ssn: &str) -> String {
    let digits: Vec<char> = ssn.chars().filter(|c| c.is_ascii_digit()).collect();
    let tail: String = digits
        .iter()
        .skip(digits.len().saturating_sub(4))
        .collect();
    format!("***-**-{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssn_formats() {
        assert_eq!(normalize_ssn("123-45-6789").unwrap(), "123456789");
        assert_eq!(normalize_ssn("123456789").unwrap(), "123456789");
        assert_eq!(normalize_ssn("  123-45-6789 ").unwrap(), "123456789");
    }

    #[test]
    fn test_invalid_ssns() {
        assert!(normalize_ssn("").is_err());
        assert!(normalize_ssn("   ").is_err());
        assert!(normalize_ssn("12-345-6789").is_err());
        assert!(normalize_ssn("1234567890").is_err());
        assert!(normalize_ssn("abc-de-fghi").is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(validate_name("  Alice Smith ").unwrap(), "Alice Smith");
        assert!(validate_name("").is_err());
        assert!(validate_name(" \t ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_prices() {
        assert_eq!(validate_price(None).unwrap(), None);
        assert_eq!(validate_price(Some(0.0)).unwrap(), Some(0.0));
        assert_eq!(validate_price(Some(99.5)).unwrap(), Some(99.5));
        assert!(validate_price(Some(-0.01)).is_err());
        assert!(validate_price(Some(f64::NAN)).is_err());
        assert_eq!(
            validate_price(Some(MAX_ITEM_PRICE)).unwrap(),
            Some(MAX_ITEM_PRICE)
        );
        assert!(validate_price(Some(1.7e308)).is_err());
    }

    #[test]
    fn test_identity_resolution() {
        let by_id = CalcScoreRequest {
            id: Some(7),
            ..Default::default()
        };
        assert_eq!(resolve_identity(&by_id).unwrap(), ApplicantIdentity::ById(7));

        let by_name = CalcScoreRequest {
            name: Some("Alice".into()),
            ssn: Some("123-45-6789".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_identity(&by_name).unwrap(),
            ApplicantIdentity::ByNameAndSsn {
                name: "Alice".into(),
                ssn: "123456789".into()
            }
        );

        let missing_ssn = CalcScoreRequest {
            name: Some("Alice".into()),
            ..Default::default()
        };
        assert!(resolve_identity(&missing_ssn).is_err());

        let bad_id = CalcScoreRequest {
            id: Some(0),
            ..Default::default()
        };
        assert!(resolve_identity(&bad_id).is_err());
    }

    #[test]
    fn test_mask_ssn() {
        assert_eq!(mask_ssn("123456789"), "***-**-6789");
        assert_eq!(mask_ssn("12"), "***-**-12");
    }
}
