use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::adjust::{net_projections, validate_inflation_rate};
use super::error::{CoreError, Result};
use super::evaluator::evaluate;
use super::sampler::{NormalSampler, SeededSampler, derive_seed, fresh_base_seed};
use super::simulator::{simulate_profile, validate_capital, validate_simulation_count};
use super::types::{
    Allocation, AssetStats, FeasibilityReport, FeeTable, Goal, MultiGoalOutcome, PlanInputs,
    SingleGoalInputs, TaxRates, WeightedProfile,
};

/// Allocation-weighted average of per-asset return and volatility.
///
/// Weights are `percent / 100` regardless of the allocation total.
pub fn weighted_profile(allocation: &Allocation, asset_stats: &AssetStats) -> Result<WeightedProfile> {
    let mut annual_return = 0.0;
    let mut annual_volatility = 0.0;
    for (asset, percent) in allocation.iter() {
        let stat = asset_stats.get(asset)?;
        let weight = percent / 100.0;
        annual_return += weight * stat.annualized_return;
        annual_volatility += weight * stat.annualized_volatility;
    }
    Ok(WeightedProfile {
        annual_return,
        annual_volatility,
    })
}

/// Evaluates every goal as if the whole investment went toward it.
///
/// Run-wide configuration errors fail the batch before any sampling. Errors that
/// belong to one goal land in `failures` and leave the other goals' reports intact.
pub fn evaluate_all(inputs: &PlanInputs) -> Result<MultiGoalOutcome> {
    validate_plan(inputs)?;
    let base_seed = resolve_seed(inputs.settings.seed);

    info!(
        goals = inputs.goals.len(),
        simulations = inputs.settings.num_simulations,
        "evaluating goal set"
    );

    let jobs = inputs.goals.iter().enumerate().collect::<Vec<_>>();
    let results = jobs
        .into_par_iter()
        .map(|(index, (name, goal))| {
            let mut sampler = SeededSampler::new(derive_seed(base_seed, index as u64));
            (name.clone(), evaluate_plan_goal(inputs, goal, &mut sampler))
        })
        .collect::<Vec<_>>();

    let mut outcome = MultiGoalOutcome::default();
    for (name, result) in results {
        match result {
            Ok(report) => {
                debug!(
                    goal = %name,
                    probability = report.feasibility.success_probability,
                    "goal evaluated"
                );
                outcome.reports.insert(name, report);
            }
            Err(err) => {
                warn!(goal = %name, error = %err, "goal evaluation failed");
                outcome.failures.insert(name, err.to_string());
            }
        }
    }
    Ok(outcome)
}

/// One goal of a plan: tilt, weight, simulate, adjust, evaluate.
pub fn evaluate_plan_goal(
    inputs: &PlanInputs,
    goal: &Goal,
    sampler: &mut impl NormalSampler,
) -> Result<FeasibilityReport> {
    goal.validate()?;
    let allocation = inputs.allocation.tilted(goal.priority);
    allocation.validate().map_err(|err| match err {
        CoreError::InvalidConfiguration(msg) => {
            CoreError::invalid(format!("after {:?} priority tilt, {msg}", goal.priority))
        }
        other => other,
    })?;
    let profile = weighted_profile(&allocation, &inputs.asset_stats)?;

    let gross = simulate_profile(
        inputs.initial_investment,
        profile,
        goal.timeline_years,
        inputs.settings.num_simulations,
        sampler,
    )?;
    let real = net_projections(
        &gross,
        &inputs.tax_rates,
        &inputs.fees,
        inputs.inflation_rate,
        goal.timeline_years,
    );

    Ok(FeasibilityReport {
        initial_investment: inputs.initial_investment,
        timeline_years: goal.timeline_years,
        priority: Some(goal.priority),
        feasibility: evaluate(&real, goal.goal_amount)?,
    })
}

pub fn check_goal_feasibility(inputs: &SingleGoalInputs) -> Result<FeasibilityReport> {
    let mut sampler = SeededSampler::new(resolve_seed(inputs.settings.seed));
    check_goal_feasibility_with(inputs, &mut sampler)
}

pub fn check_goal_feasibility_with(
    inputs: &SingleGoalInputs,
    sampler: &mut impl NormalSampler,
) -> Result<FeasibilityReport> {
    validate_capital(inputs.initial_investment)?;
    validate_simulation_count(inputs.settings.num_simulations)?;
    Goal {
        goal_amount: inputs.goal_amount,
        timeline_years: inputs.timeline_years,
        priority: Default::default(),
    }
    .validate()?;
    inputs.asset_stats.validate()?;
    inputs.allocation.validate()?;
    let profile = weighted_profile(&inputs.allocation, &inputs.asset_stats)?;

    let projections = simulate_profile(
        inputs.initial_investment,
        profile,
        inputs.timeline_years,
        inputs.settings.num_simulations,
        sampler,
    )?;

    Ok(FeasibilityReport {
        initial_investment: inputs.initial_investment,
        timeline_years: inputs.timeline_years,
        priority: None,
        feasibility: evaluate(&projections, inputs.goal_amount)?,
    })
}

/// Evaluates an already simulated gross projection set after fees, tax and inflation.
pub fn evaluate_net_projections(
    initial_investment: f64,
    goal_amount: f64,
    projections: &[f64],
    tax_rates: &TaxRates,
    fees: &FeeTable,
    inflation_rate: f64,
    holding_period: u32,
) -> Result<FeasibilityReport> {
    validate_capital(initial_investment)?;
    tax_rates.validate()?;
    fees.validate()?;
    validate_inflation_rate(inflation_rate)?;
    let real = net_projections(projections, tax_rates, fees, inflation_rate, holding_period);
    Ok(FeasibilityReport {
        initial_investment,
        timeline_years: holding_period,
        priority: None,
        feasibility: evaluate(&real, goal_amount)?,
    })
}

fn validate_plan(inputs: &PlanInputs) -> Result<()> {
    validate_capital(inputs.initial_investment)?;
    validate_simulation_count(inputs.settings.num_simulations)?;
    if inputs.goals.is_empty() {
        return Err(CoreError::invalid("at least one goal is required"));
    }
    inputs.tax_rates.validate()?;
    inputs.fees.validate()?;
    validate_inflation_rate(inputs.inflation_rate)?;
    inputs.asset_stats.validate()?;
    inputs.allocation.validate()
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed = fresh_base_seed();
        debug!(seed, "no seed supplied, drew base seed from entropy");
        seed
    })
}
