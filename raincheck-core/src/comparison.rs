//! Simulated multi-provider disagreement.
//!
//! Only the first estimate comes from real data. The other two are the same
//! total scaled by a random factor, to show how far models can drift apart.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::Serialize;

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEstimate {
    pub provider_name: String,
    /// Millimetres, rounded to one decimal.
    pub rain_amount: f64,
    pub note: String,
}

impl ComparisonEstimate {
    /// The amount formatted the way it is displayed, e.g. "3.2".
    pub fn rain_text(&self) -> String {
        format!("{:.1}", self.rain_amount)
    }
}

struct Profile {
    name: &'static str,
    note: &'static str,
    jitter: Option<RangeInclusive<f64>>,
}

const PROFILES: [Profile; 3] = [
    Profile { name: "Open-Meteo", note: "high", jitter: None },
    Profile { name: "AEMET", note: "moderate variation", jitter: Some(0.9..=1.2) },
    Profile { name: "Google", note: "satellite data", jitter: Some(0.8..=1.2) },
];

/// Three estimates of today's rain: the real total and two jittered copies.
pub fn synthesize<R: Rng>(daily_total: f64, rng: &mut R) -> Vec<ComparisonEstimate> {
    PROFILES
        .iter()
        .map(|profile| {
            let factor = match &profile.jitter {
                Some(range) => rng.gen_range(range.clone()),
                None => 1.0,
            };
            ComparisonEstimate {
                provider_name: profile.name.to_string(),
                rain_amount: round_tenth(daily_total * factor),
                note: profile.note.to_string(),
            }
        })
        .collect()
}

fn round_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // avoid printing "-0.0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn zero_total_gives_zero_everywhere() {
        let mut rng = StdRng::seed_from_u64(7);
        let estimates = synthesize(0.0, &mut rng);

        assert_eq!(estimates.len(), 3);
        for estimate in &estimates {
            assert_eq!(estimate.rain_text(), "0.0");
        }
    }

    #[test]
    fn first_provider_is_unchanged() {
        let mut rng = StdRng::seed_from_u64(1);
        let estimates = synthesize(12.34, &mut rng);

        assert_eq!(estimates[0].provider_name, "Open-Meteo");
        assert_eq!(estimates[0].rain_amount, 12.3);
        assert_eq!(estimates[0].note, "high");
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let estimates = synthesize(10.0, &mut rng);

            assert_eq!(estimates[1].provider_name, "AEMET");
            assert_eq!(estimates[1].note, "moderate variation");
            assert!((9.0..=12.0).contains(&estimates[1].rain_amount));

            assert_eq!(estimates[2].provider_name, "Google");
            assert_eq!(estimates[2].note, "satellite data");
            assert!((8.0..=12.0).contains(&estimates[2].rain_amount));
        }
    }

    #[test]
    fn same_seed_same_estimates() {
        let a = synthesize(5.5, &mut StdRng::seed_from_u64(99));
        let b = synthesize(5.5, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn amounts_have_one_decimal() {
        let estimates = synthesize(3.14159, &mut StdRng::seed_from_u64(3));
        for estimate in estimates {
            let text = estimate.rain_text();
            assert_eq!(text.split('.').nth(1).map(str::len), Some(1), "{text}");
        }
    }
}
