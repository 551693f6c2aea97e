/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use credit_quote_api::features::{synthesize_features, FeatureRanges};
use credit_quote_api::models::ApplicantFeatures;
use credit_quote_api::pricing::{build_payment_options, interest_rate_for_score};
use credit_quote_api::scoring::{formula_score, ScoreBreakdown, MAX_SCORE, MIN_SCORE};
use credit_quote_api::validation::{normalize_ssn, validate_name};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn any_features() -> impl Strategy<Value = ApplicantFeatures> {
    (0i32..=120, 500.0f64..=5000.0, 100.0f64..=4000.0, 0i32..=24).prop_map(
        |(employment_months, incoming_cash, outgoing_cash, on_time_payments)| ApplicantFeatures {
            employment_months,
            incoming_cash,
            outgoing_cash,
            on_time_payments,
        },
    )
}

// Property: every sub-score is a percentage and the final score stays in range
proptest! {
    #[test]
    fn sub_scores_are_percentages(features in any_features()) {
        let breakdown = ScoreBreakdown::from_features(&features);
        for sub in [breakdown.employment_score, breakdown.cashflow_score, breakdown.punctuality_score] {
            prop_assert!((0.0..=100.0).contains(&sub));
        }
    }

    #[test]
    fn formula_score_in_product_range(features in any_features()) {
        let score = formula_score(&features);
        prop_assert!((MIN_SCORE..=MAX_SCORE).contains(&score));
        // Rounded to cents
        prop_assert!(((score * 100.0).round() - score * 100.0).abs() < 1e-6);
    }

    #[test]
    fn synthesized_features_respect_ranges(seed in any::<u64>()) {
        let ranges = FeatureRanges::default();
        let features = synthesize_features(&mut StdRng::seed_from_u64(seed), &ranges);
        prop_assert!(ranges.contains(&features));
    }
}

// Property: every score at or above 300 maps to a rate in the table
proptest! {
    #[test]
    fn rate_is_within_table(score in 300.0f64..1000.0) {
        let rate = interest_rate_for_score(score).unwrap().rate;
        // The 579..580 gap extends the first band slightly past 36%
        prop_assert!((4.0..=36.05).contains(&rate));
    }

    #[test]
    fn top_band_is_flat(score in 800.0f64..1.0e6) {
        prop_assert_eq!(interest_rate_for_score(score).unwrap().rate, 4.0);
    }

    #[test]
    fn scores_below_table_rejected(score in -1.0e6f64..299.99) {
        prop_assert!(interest_rate_for_score(score).is_err());
    }
}

// Property: plans always add back up to the total owed
proptest! {
    #[test]
    fn plans_reconcile_with_total(score in 300.0f64..=800.0, price in 0.0f64..100_000.0) {
        let rate = interest_rate_for_score(score).unwrap();
        let options = build_payment_options(price, &rate).unwrap();

        prop_assert!(options.total_amount >= price - 0.005);

        let first = options.four_week_plan.first_quarter_payment;
        for plan in options.plans() {
            prop_assert_eq!(plan.first_quarter_payment, first);
            prop_assert!(plan.weekly_payment >= 0.0);

            let weeks = f64::from(plan.total_weeks);
            let paid = plan.weekly_payment * weeks + plan.first_quarter_payment;
            let tolerance = weeks * 0.005 + 0.005;
            prop_assert!(
                (paid - options.total_amount).abs() <= tolerance,
                "{}-week plan: paid {} vs total {}", plan.total_weeks, paid, options.total_amount
            );
        }
    }
}

// Property: validation never panics
proptest! {
    #[test]
    fn ssn_validation_never_panics(ssn in "\\PC*") {
        let _ = normalize_ssn(&ssn);
    }

    #[test]
    fn name_validation_never_panics(name in "\\PC*") {
        let _ = validate_name(&name);
    }

    #[test]
    fn formatted_and_bare_ssn_agree(area in 0u32..1000, group in 0u32..100, serial in 0u32..10000) {
        let dashed = format!("{:03}-{:02}-{:04}", area, group, serial);
        let bare = format!("{:03}{:02}{:04}", area, group, serial);

        let normalized = normalize_ssn(&dashed).unwrap();
        prop_assert_eq!(&normalized, &bare);
        prop_assert_eq!(normalize_ssn(&bare).unwrap(), bare);
    }
}
