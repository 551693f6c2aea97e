//! Score-to-price pipeline: interest-rate bands and installment plans.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scoring::{round2, MIN_SCORE};

/// Scores at or above this get the flat top-band rate.
pub const TOP_BAND_START: f64 = 800.0;
pub const TOP_BAND_RATE: f64 = 4.0;

/// Plan lengths offered, in weeks.
pub const PLAN_LENGTHS: [u32; 3] = [4, 8, 12];

/// Linear rate band over `[start, end]`.
///
/// A score falling in the gap between `end` and the next band's `start`
/// (e.g. 579.5) is priced by this band's line extended to the gap.
#[derive(Debug, Clone, Copy)]
struct RateBand {
    start: f64,
    end: f64,
    rate_at_start: f64,
    rate_at_end: f64,
}

impl RateBand {
    fn rate(&self, score: f64) -> f64 {
        self.rate_at_start
            + (self.rate_at_end - self.rate_at_start) * (score - self.start)
                / (self.end - self.start)
    }
}

// Ordered by start. Rates drop at every band boundary.
const RATE_BANDS: [RateBand; 4] = [
    RateBand {
        start: 300.0,
        end: 579.0,
        rate_at_start: 25.0,
        rate_at_end: 36.0,
    },
    RateBand {
        start: 580.0,
        end: 669.0,
        rate_at_start: 15.0,
        rate_at_end: 24.0,
    },
    RateBand {
        start: 670.0,
        end: 739.0,
        rate_at_start: 10.0,
        rate_at_end: 14.0,
    },
    RateBand {
        start: 740.0,
        end: 799.0,
        rate_at_start: 7.0,
        rate_at_end: 9.0,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Score below the rate table or not a number.
    ScoreOutOfRange(f64),
    /// Price negative or not a number.
    InvalidPrice(f64),
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::ScoreOutOfRange(score) => write!(
                f,
                "Score {} is outside the rate table (minimum {})",
                score, MIN_SCORE
            ),
            PricingError::InvalidPrice(price) => {
                write!(f, "Item price must be a non-negative number, got {}", price)
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// An interest rate (percent) and the score it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestRate {
    pub rate: f64,
    pub score: f64,
}

impl InterestRate {
    /// Human-readable descriptor embedded in quotes.
    pub fn describe(&self) -> String {
        format!(
            "{:.2}% (based on credit score {:.2})",
            self.rate, self.score
        )
    }
}

/// Map a score to its interest rate.
///
/// Scores below 300 are rejected rather than clamped; the score engine never
/// produces them.
pub fn interest_rate_for_score(score: f64) -> Result<InterestRate, PricingError> {
    if !score.is_finite() || score < MIN_SCORE {
        return Err(PricingError::ScoreOutOfRange(score));
    }

    if score >= TOP_BAND_START {
        return Ok(InterestRate {
            rate: TOP_BAND_RATE,
            score,
        });
    }

    let band = RATE_BANDS
        .iter()
        .rev()
        .find(|band| score >= band.start)
        .ok_or(PricingError::ScoreOutOfRange(score))?;

    Ok(InterestRate {
        rate: round2(band.rate(score)),
        score,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub total_weeks: u32,
    pub weekly_payment: f64,
    pub first_quarter_payment: f64,
}

/// The three installment plans for one quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOptions {
    /// Price plus interest, unrounded.
    pub total_amount: f64,
    pub interest_rate: String,
    #[serde(rename = "4_week_plan")]
    pub four_week_plan: PaymentPlan,
    #[serde(rename = "8_week_plan")]
    pub eight_week_plan: PaymentPlan,
    #[serde(rename = "12_week_plan")]
    pub twelve_week_plan: PaymentPlan,
}

impl PaymentOptions {
    pub fn plans(&self) -> [&PaymentPlan; 3] {
        [
            &self.four_week_plan,
            &self.eight_week_plan,
            &self.twelve_week_plan,
        ]
    }
}

/// Build the 4/8/12-week plans for `price` at `rate`.
///
/// The first payment is a quarter of the total regardless of plan length;
/// the remainder is split evenly across the weeks.
pub fn build_payment_options(
    price: f64,
    rate: &InterestRate,
) -> Result<PaymentOptions, PricingError> {
    if !price.is_finite() || price < 0.0 {
        return Err(PricingError::InvalidPrice(price));
    }

    let total_amount = price * (1.0 + rate.rate / 100.0);
    if !total_amount.is_finite() {
        return Err(PricingError::InvalidPrice(price));
    }
    let first_quarter_payment = round2(total_amount / 4.0);
    let remaining = total_amount - first_quarter_payment;

    let plan = |total_weeks: u32| PaymentPlan {
        total_weeks,
        weekly_payment: round2(remaining / f64::from(total_weeks)),
        first_quarter_payment,
    };
    let [four, eight, twelve] = PLAN_LENGTHS;

    Ok(PaymentOptions {
        total_amount,
        interest_rate: rate.describe(),
        four_week_plan: plan(four),
        eight_week_plan: plan(eight),
        twelve_week_plan: plan(twelve),
    })
}
