//! Simulated weekly trend
//!
//! The series is synthetic: six points jittered within one percent of the
//! current rate followed by the rate itself. Nothing here is historical data.

use rand::Rng;

pub const TREND_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Maximum relative deviation of the simulated points.
pub const MAX_DEVIATION: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub label: &'static str,
    pub value: f64,
}

pub fn synthesize<R: Rng + ?Sized>(base_rate: f64, rng: &mut R) -> Vec<TrendPoint> {
    let last = TREND_LABELS.len() - 1;
    TREND_LABELS
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let value = if i == last {
                base_rate
            } else {
                base_rate * (1.0 + rng.gen_range(-MAX_DEVIATION..=MAX_DEVIATION))
            };
            TrendPoint { label, value }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_series_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for base_rate in [0.709, 3.75, 1.0, 1234.5] {
            let series = synthesize(base_rate, &mut rng);
            assert_eq!(series.len(), 7);
            assert_eq!(series[6].value, base_rate);
            for point in &series[..6] {
                let deviation = (point.value - base_rate).abs();
                assert!(
                    deviation <= base_rate * MAX_DEVIATION + 1e-12,
                    "{} strays too far from {}",
                    point.value,
                    base_rate
                );
            }
        }
    }

    #[test]
    fn test_labels_are_weekdays() {
        let mut rng = StdRng::seed_from_u64(1);
        let labels: Vec<_> = synthesize(2.0, &mut rng).iter().map(|p| p.label).collect();
        assert_eq!(labels, TREND_LABELS);
    }

    #[test]
    fn test_zero_rate_is_flat() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(synthesize(0.0, &mut rng).iter().all(|p| p.value == 0.0));
    }
}
