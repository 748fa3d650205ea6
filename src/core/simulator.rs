use super::error::{CoreError, Result};
use super::sampler::NormalSampler;
use super::types::WeightedProfile;

/// Terminal values of `num_simulations` independent growth paths.
///
/// Each path compounds `years` normal draws multiplicatively from
/// `initial_investment`. Growth factors are not clamped, so a path may end at or
/// below zero; such values are valid failing outcomes for the evaluator.
pub fn simulate(
    initial_investment: f64,
    annual_return: f64,
    annual_volatility: f64,
    years: u32,
    num_simulations: u32,
    sampler: &mut impl NormalSampler,
) -> Result<Vec<f64>> {
    validate_simulation(
        initial_investment,
        annual_return,
        annual_volatility,
        years,
        num_simulations,
    )?;

    let mut projections = Vec::with_capacity(num_simulations as usize);
    for _ in 0..num_simulations {
        let mut end_value = initial_investment;
        for _ in 0..years {
            let growth = sampler.draw_normal(annual_return, annual_volatility);
            end_value *= 1.0 + growth;
        }
        projections.push(end_value);
    }
    Ok(projections)
}

pub fn simulate_profile(
    initial_investment: f64,
    profile: WeightedProfile,
    years: u32,
    num_simulations: u32,
    sampler: &mut impl NormalSampler,
) -> Result<Vec<f64>> {
    simulate(
        initial_investment,
        profile.annual_return,
        profile.annual_volatility,
        years,
        num_simulations,
        sampler,
    )
}

pub(crate) fn validate_capital(initial_investment: f64) -> Result<()> {
    if !initial_investment.is_finite() || initial_investment <= 0.0 {
        return Err(CoreError::invalid(format!(
            "initial investment must be > 0, got {initial_investment}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_simulation_count(num_simulations: u32) -> Result<()> {
    if num_simulations < 1 {
        return Err(CoreError::invalid("number of simulations must be > 0"));
    }
    Ok(())
}

fn validate_simulation(
    initial_investment: f64,
    annual_return: f64,
    annual_volatility: f64,
    years: u32,
    num_simulations: u32,
) -> Result<()> {
    validate_capital(initial_investment)?;
    validate_simulation_count(num_simulations)?;
    if years < 1 {
        return Err(CoreError::invalid("simulation horizon must be at least 1 year"));
    }
    if !annual_return.is_finite() {
        return Err(CoreError::invalid("annual return must be finite"));
    }
    if !annual_volatility.is_finite() || annual_volatility < 0.0 {
        return Err(CoreError::invalid(format!(
            "annual volatility must be >= 0, got {annual_volatility}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::SeededSampler;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    /// Replays a fixed list of growth draws, ignoring the requested parameters.
    struct ScriptedSampler {
        draws: Vec<f64>,
        next: usize,
    }

    impl NormalSampler for ScriptedSampler {
        fn draw_normal(&mut self, _mean: f64, _std_dev: f64) -> f64 {
            let value = self.draws[self.next % self.draws.len()];
            self.next += 1;
            value
        }
    }

    /// Counts draws so tests can assert nothing was sampled.
    #[derive(Default)]
    struct CountingSampler {
        calls: usize,
    }

    impl NormalSampler for CountingSampler {
        fn draw_normal(&mut self, mean: f64, _std_dev: f64) -> f64 {
            self.calls += 1;
            mean
        }
    }

    #[test]
    fn fixed_seed_reproduces_distribution() {
        let mut a = SeededSampler::new(2024);
        let mut b = SeededSampler::new(2024);
        let first = simulate(50_000.0, 0.08, 0.10, 10, 1_000, &mut a).expect("valid inputs");
        let second = simulate(50_000.0, 0.08, 0.10, 10, 1_000, &mut b).expect("valid inputs");
        assert_eq!(first.len(), 1_000);
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_produce_different_distributions() {
        let first = simulate(50_000.0, 0.08, 0.10, 10, 200, &mut SeededSampler::new(1))
            .expect("valid inputs");
        let second = simulate(50_000.0, 0.08, 0.10, 10, 200, &mut SeededSampler::new(2))
            .expect("valid inputs");
        assert_ne!(first, second);
    }

    #[test]
    fn zero_volatility_compounds_deterministically() {
        let mut sampler = SeededSampler::new(5);
        let values = simulate(1_000.0, 0.05, 0.0, 3, 4, &mut sampler).expect("valid inputs");
        let expected = 1_000.0 * 1.05_f64.powi(3);
        for v in values {
            assert!((v - expected).abs() <= EPS, "expected {expected}, got {v}");
        }
    }

    #[test]
    fn compounding_follows_drawn_growth_path() {
        let mut sampler = ScriptedSampler {
            draws: vec![0.10, -0.20, 0.05],
            next: 0,
        };
        let values = simulate(100.0, 0.0, 0.1, 3, 1, &mut sampler).expect("valid inputs");
        assert!((values[0] - 100.0 * 1.10 * 0.80 * 1.05).abs() <= EPS);
    }

    #[test]
    fn losses_beyond_total_are_not_clamped() {
        let mut sampler = ScriptedSampler {
            draws: vec![-1.5],
            next: 0,
        };
        let values = simulate(100.0, 0.0, 1.0, 1, 2, &mut sampler).expect("valid inputs");
        assert_eq!(values, vec![-50.0, -50.0]);
    }

    #[test]
    fn invalid_parameters_are_rejected_before_sampling() {
        let cases: [(f64, f64, f64, u32, u32); 6] = [
            (0.0, 0.08, 0.1, 10, 100),
            (-1.0, 0.08, 0.1, 10, 100),
            (1_000.0, 0.08, -0.1, 10, 100),
            (1_000.0, 0.08, 0.1, 0, 100),
            (1_000.0, 0.08, 0.1, 10, 0),
            (1_000.0, f64::NAN, 0.1, 10, 100),
        ];
        for (capital, ret, vol, years, sims) in cases {
            let mut sampler = CountingSampler::default();
            let err = simulate(capital, ret, vol, years, sims, &mut sampler)
                .expect_err("must reject invalid configuration");
            assert!(matches!(err, CoreError::InvalidConfiguration(_)));
            assert_eq!(sampler.calls, 0);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn distribution_length_matches_simulation_count(
            sims in 1_u32..300,
            years in 1_u32..30,
            seed in 0_u64..1_000,
        ) {
            let mut sampler = SeededSampler::new(seed);
            let values = simulate(10_000.0, 0.06, 0.15, years, sims, &mut sampler)
                .expect("valid inputs");
            prop_assert_eq!(values.len(), sims as usize);
            prop_assert!(values.iter().all(|v| v.is_finite()));
        }
    }
}
