//! Synthetic applicant attributes.
//!
//! Stands in for a real data-ingestion pipeline: every attribute is drawn
//! independently and uniformly from an inclusive integer range.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::ApplicantFeatures;

/// Inclusive integer range for a single attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: i64,
    pub max: i64,
}

impl FeatureRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min as f64 && value <= self.max as f64
    }

    /// True when `self` is non-empty and lies entirely within `outer`.
    pub fn is_within(&self, outer: &FeatureRange) -> bool {
        self.min <= self.max && self.min >= outer.min && self.max <= outer.max
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Sampling ranges for the four attributes, in model schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRanges {
    pub employment_months: FeatureRange,
    pub incoming_cash: FeatureRange,
    pub outgoing_cash: FeatureRange,
    pub on_time_payments: FeatureRange,
}

impl Default for FeatureRanges {
    fn default() -> Self {
        Self {
            employment_months: FeatureRange::new(0, 120),
            incoming_cash: FeatureRange::new(500, 5000),
            outgoing_cash: FeatureRange::new(100, 4000),
            on_time_payments: FeatureRange::new(0, 24),
        }
    }
}

impl FeatureRanges {
    pub fn as_array(&self) -> [FeatureRange; 4] {
        [
            self.employment_months,
            self.incoming_cash,
            self.outgoing_cash,
            self.on_time_payments,
        ]
    }

    /// Every range is non-empty and a sub-range of the product defaults.
    pub fn is_within_defaults(&self) -> bool {
        let defaults = Self::default().as_array();
        self.as_array()
            .iter()
            .zip(defaults.iter())
            .all(|(range, outer)| range.is_within(outer))
    }

    /// Tightest integer ranges covering every observed row, kept inside the
    /// defaults. `None` when there are no rows.
    pub fn observed<'a, I>(rows: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ApplicantFeatures>,
    {
        let mut bounds: Option<[(f64, f64); 4]> = None;
        for features in rows {
            let values = features.as_array();
            let b = bounds.get_or_insert_with(|| values.map(|v| (v, v)));
            for (slot, v) in b.iter_mut().zip(values) {
                slot.0 = slot.0.min(v);
                slot.1 = slot.1.max(v);
            }
        }
        let bounds = bounds?;

        let defaults = Self::default().as_array();
        let fit = |i: usize| {
            let outer = defaults[i];
            let (lo, hi) = bounds[i];
            let min = (lo.floor() as i64).clamp(outer.min, outer.max);
            let max = (hi.ceil() as i64).clamp(min, outer.max);
            FeatureRange::new(min, max)
        };

        Some(Self {
            employment_months: fit(0),
            incoming_cash: fit(1),
            outgoing_cash: fit(2),
            on_time_payments: fit(3),
        })
    }

    pub fn contains(&self, features: &ApplicantFeatures) -> bool {
        self.as_array()
            .iter()
            .zip(features.as_array())
            .all(|(range, value)| range.contains(value))
    }
}

/// Draw one applicant's attributes.
pub fn synthesize_features<R: Rng + ?Sized>(
    rng: &mut R,
    ranges: &FeatureRanges,
) -> ApplicantFeatures {
    ApplicantFeatures {
        employment_months: ranges.employment_months.sample(rng) as i32,
        incoming_cash: ranges.incoming_cash.sample(rng) as f64,
        outgoing_cash: ranges.outgoing_cash.sample(rng) as f64,
        on_time_payments: ranges.on_time_payments.sample(rng) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_stay_in_default_ranges() {
        let ranges = FeatureRanges::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1_000 {
            let features = synthesize_features(&mut rng, &ranges);
            assert!(ranges.contains(&features), "out of range: {:?}", features);
        }
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let ranges = FeatureRanges {
            employment_months: FeatureRange::new(60, 60),
            incoming_cash: FeatureRange::new(3000, 3000),
            outgoing_cash: FeatureRange::new(1000, 1000),
            on_time_payments: FeatureRange::new(12, 12),
        };
        let mut rng = StdRng::seed_from_u64(1);

        let features = synthesize_features(&mut rng, &ranges);

        assert_eq!(features.employment_months, 60);
        assert_eq!(features.incoming_cash, 3000.0);
        assert_eq!(features.outgoing_cash, 1000.0);
        assert_eq!(features.on_time_payments, 12);
    }

    #[test]
    fn test_same_seed_same_features() {
        let ranges = FeatureRanges::default();
        let a = synthesize_features(&mut StdRng::seed_from_u64(42), &ranges);
        let b = synthesize_features(&mut StdRng::seed_from_u64(42), &ranges);
        assert_eq!(a, b);
    }

    #[test]
    fn test_observed_ranges() {
        let rows = [
            ApplicantFeatures {
                employment_months: 10,
                incoming_cash: 1200.0,
                outgoing_cash: 300.5,
                on_time_payments: 4,
            },
            ApplicantFeatures {
                employment_months: 90,
                incoming_cash: 800.0,
                outgoing_cash: 2500.0,
                on_time_payments: 20,
            },
        ];

        let observed = FeatureRanges::observed(&rows).unwrap();

        assert_eq!(observed.employment_months, FeatureRange::new(10, 90));
        assert_eq!(observed.incoming_cash, FeatureRange::new(800, 1200));
        assert_eq!(observed.outgoing_cash, FeatureRange::new(300, 2500));
        assert_eq!(observed.on_time_payments, FeatureRange::new(4, 20));
        assert!(observed.is_within_defaults());
        assert!(rows.iter().all(|f| observed.contains(f)));
    }

    #[test]
    fn test_observed_ranges_clamped_to_defaults() {
        let rows = [ApplicantFeatures {
            employment_months: 60,
            incoming_cash: 9000.0,
            outgoing_cash: 50.0,
            on_time_payments: 12,
        }];

        let observed = FeatureRanges::observed(&rows).unwrap();

        assert_eq!(observed.incoming_cash, FeatureRange::new(5000, 5000));
        assert_eq!(observed.outgoing_cash, FeatureRange::new(100, 100));
        assert!(observed.is_within_defaults());
        assert_eq!(FeatureRanges::observed(std::iter::empty()), None);
    }

    #[test]
    fn test_within_defaults() {
        assert!(FeatureRanges::default().is_within_defaults());

        let mut wide = FeatureRanges::default();
        wide.employment_months = FeatureRange::new(0, 240);
        assert!(!wide.is_within_defaults());

        let mut inverted = FeatureRanges::default();
        inverted.on_time_payments = FeatureRange::new(20, 10);
        assert!(!inverted.is_within_defaults());
    }
}
