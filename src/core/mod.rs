mod adjust;
mod error;
mod evaluator;
mod orchestrator;
mod sampler;
mod simulator;
mod types;

pub use adjust::{adjust_for_inflation, apply_taxes_and_fees, net_projections};
pub use error::{CoreError, Result};
pub use evaluator::{ACHIEVABLE_PROBABILITY, evaluate};
pub use orchestrator::{
    check_goal_feasibility, check_goal_feasibility_with, evaluate_all, evaluate_net_projections,
    evaluate_plan_goal, weighted_profile,
};
pub use sampler::{NormalSampler, SeededSampler, derive_seed};
pub use simulator::{simulate, simulate_profile};
pub use types::{
    AssetStat, AssetStats, Allocation, BONDS, CRYPTO, DEFAULT_SIMULATIONS, Feasibility,
    FeasibilityReport, FeeTable, Goal, MultiGoalOutcome, PlanInputs, Priority, REAL_ESTATE,
    RecommendationTier, STOCKS, SimulationSettings, SingleGoalInputs, TaxRates, WeightedProfile,
};
