use super::error::{CoreError, Result};
use super::types::{Feasibility, RecommendationTier};

pub const ACHIEVABLE_PROBABILITY: f64 = 75.0;

pub fn evaluate(distribution: &[f64], goal_amount: f64) -> Result<Feasibility> {
    if distribution.is_empty() {
        return Err(CoreError::invalid(
            "cannot evaluate a goal against an empty distribution",
        ));
    }
    if !goal_amount.is_finite() {
        return Err(CoreError::invalid("goal amount must be finite"));
    }

    let successes = distribution.iter().filter(|&&v| v >= goal_amount).count();
    let success_probability = round2(successes as f64 / distribution.len() as f64 * 100.0);

    let mut sorted = distribution.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median_projection = round2(percentile_sorted(&sorted, 50.0));
    let projection_range = (
        round2(percentile_sorted(&sorted, 25.0)),
        round2(percentile_sorted(&sorted, 75.0)),
    );

    Ok(Feasibility {
        goal_amount,
        success_probability,
        median_projection,
        projection_range,
        tier: RecommendationTier::classify(success_probability, median_projection, goal_amount),
    })
}

impl RecommendationTier {
    pub fn classify(success_probability: f64, median: f64, goal_amount: f64) -> Self {
        if success_probability >= ACHIEVABLE_PROBABILITY {
            RecommendationTier::Achievable
        } else if median >= goal_amount {
            RecommendationTier::MedianAboveGoal
        } else {
            RecommendationTier::NotOnTrack
        }
    }
}

/// Linear interpolation between order statistics of an ascending slice.
fn percentile_sorted(values: &[f64], p: f64) -> f64 {
    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] + (values[upper] - values[lower]) * w
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn four_sample_distribution_matches_hand_calculation() {
        let result = evaluate(&[900_000.0, 1_000_000.0, 1_100_000.0, 1_200_000.0], 1_000_000.0)
            .expect("non-empty distribution");
        assert_approx(result.success_probability, 75.0);
        assert_approx(result.median_projection, 1_050_000.0);
        assert_approx(result.projection_range.0, 975_000.0);
        assert_approx(result.projection_range.1, 1_125_000.0);
        assert_eq!(result.tier, RecommendationTier::Achievable);
    }

    #[test]
    fn unsorted_input_gives_same_statistics() {
        let sorted = evaluate(&[1.0, 2.0, 3.0, 4.0, 5.0], 3.0).expect("valid");
        let shuffled = evaluate(&[4.0, 1.0, 5.0, 3.0, 2.0], 3.0).expect("valid");
        assert_eq!(sorted, shuffled);
        assert_approx(sorted.median_projection, 3.0);
        assert_approx(sorted.projection_range.0, 2.0);
        assert_approx(sorted.projection_range.1, 4.0);
        assert_approx(sorted.success_probability, 60.0);
    }

    #[test]
    fn empty_distribution_is_invalid_configuration() {
        let err = evaluate(&[], 1_000.0).expect_err("must reject empty distribution");
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[test]
    fn single_sample_fills_every_statistic() {
        let result = evaluate(&[123.456], 100.0).expect("valid");
        assert_approx(result.median_projection, 123.46);
        assert_eq!(result.projection_range, (123.46, 123.46));
        assert_approx(result.success_probability, 100.0);
    }

    #[test]
    fn non_positive_outcomes_count_as_failures() {
        let result = evaluate(&[-10.0, 0.0, 50.0], 1.0).expect("valid");
        assert_approx(result.success_probability, 33.33);
    }

    #[test]
    fn tiers_split_on_probability_then_median() {
        assert_eq!(
            RecommendationTier::classify(75.0, 0.0, 100.0),
            RecommendationTier::Achievable
        );
        assert_eq!(
            RecommendationTier::classify(60.0, 100.0, 100.0),
            RecommendationTier::MedianAboveGoal
        );
        assert_eq!(
            RecommendationTier::classify(74.99, 99.99, 100.0),
            RecommendationTier::NotOnTrack
        );
    }

    #[test]
    fn median_above_goal_with_low_probability() {
        // 2 of 4 reach the goal: probability 50, median sits exactly on the goal.
        let result = evaluate(&[10.0, 90.0, 110.0, 200.0], 100.0).expect("valid");
        assert_approx(result.success_probability, 50.0);
        assert_approx(result.median_projection, 100.0);
        assert_eq!(result.tier, RecommendationTier::MedianAboveGoal);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn probability_bounded_and_quartiles_ordered(
            values in proptest::collection::vec(-1.0e6_f64..1.0e7, 1..128),
            goal in -1.0e6_f64..1.0e7,
        ) {
            let result = evaluate(&values, goal).expect("non-empty distribution");
            prop_assert!((0.0..=100.0).contains(&result.success_probability));
            let (p25, p75) = result.projection_range;
            prop_assert!(p25 <= result.median_projection);
            prop_assert!(result.median_projection <= p75);
        }

        #[test]
        fn evaluation_is_idempotent(
            values in proptest::collection::vec(-1.0e6_f64..1.0e7, 1..64),
            goal in 0.0_f64..1.0e7,
        ) {
            let first = evaluate(&values, goal).expect("valid");
            let second = evaluate(&values, goal).expect("valid");
            prop_assert_eq!(first, second);
        }

        #[test]
        fn raising_goal_never_raises_probability(
            values in proptest::collection::vec(-1.0e6_f64..1.0e7, 1..64),
            goal in 0.0_f64..1.0e7,
            bump in 0.0_f64..1.0e6,
        ) {
            let lower = evaluate(&values, goal).expect("valid");
            let higher = evaluate(&values, goal + bump).expect("valid");
            prop_assert!(higher.success_probability <= lower.success_probability);
        }
    }
}
