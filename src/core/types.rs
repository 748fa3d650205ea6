use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{CoreError, Result};

pub const DEFAULT_SIMULATIONS: u32 = 1_000;
pub const ALLOCATION_TOTAL: f64 = 100.0;
/// Allowed drift of an allocation total, covering weights rounded to two decimals.
pub const ALLOCATION_TOLERANCE: f64 = 0.1;
pub const TILT_POINTS: f64 = 10.0;

pub const STOCKS: &str = "stocks";
pub const BONDS: &str = "bonds";
pub const CRYPTO: &str = "crypto";
pub const REAL_ESTATE: &str = "real_estate";

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStat {
    pub annualized_return: f64,
    pub annualized_volatility: f64,
}

/// Return/volatility snapshot per asset class, fixed for one evaluation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetStats(BTreeMap<String, AssetStat>);

impl AssetStats {
    pub fn get(&self, asset: &str) -> Result<AssetStat> {
        self.0
            .get(asset)
            .copied()
            .ok_or_else(|| CoreError::MissingAssetData(asset.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for (asset, stat) in &self.0 {
            if !stat.annualized_return.is_finite() {
                return Err(CoreError::invalid(format!(
                    "annualized return for '{asset}' must be finite"
                )));
            }
            if !stat.annualized_volatility.is_finite() || stat.annualized_volatility < 0.0 {
                return Err(CoreError::invalid(format!(
                    "annualized volatility for '{asset}' must be >= 0"
                )));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, AssetStat)> for AssetStats {
    fn from_iter<I: IntoIterator<Item = (K, AssetStat)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Percentage weight per asset class. A valid allocation sums to 100.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation(BTreeMap<String, f64>);

impl Allocation {
    pub fn weight(&self, asset: &str) -> f64 {
        self.0.get(asset).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(CoreError::invalid("allocation must not be empty"));
        }
        for (asset, weight) in &self.0 {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(CoreError::invalid(format!(
                    "allocation weight for '{asset}' must be >= 0, got {weight}"
                )));
            }
        }
        let total = self.total();
        if (total - ALLOCATION_TOTAL).abs() > ALLOCATION_TOLERANCE {
            return Err(CoreError::invalid(format!(
                "allocation must sum to {ALLOCATION_TOTAL}, got {total:.4}"
            )));
        }
        Ok(())
    }

    /// Moves `points` percentage points from `from` to `to` without renormalizing.
    pub fn shifted(&self, from: &str, to: &str, points: f64) -> Self {
        let mut next = self.0.clone();
        *next.entry(from.to_string()).or_insert(0.0) -= points;
        *next.entry(to.to_string()).or_insert(0.0) += points;
        Self(next)
    }

    pub fn tilted(&self, priority: Priority) -> Self {
        match priority {
            Priority::High => self.shifted(CRYPTO, BONDS, TILT_POINTS),
            Priority::Medium => self.clone(),
            Priority::Low => self.shifted(BONDS, STOCKS, TILT_POINTS),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WeightedProfile {
    pub annual_return: f64,
    pub annual_volatility: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRates {
    #[serde(alias = "short_term")]
    pub short_term: f64,
    #[serde(alias = "long_term")]
    pub long_term: f64,
}

impl TaxRates {
    /// Holdings of at least one year are taxed at the long-term rate.
    pub fn rate_for(&self, holding_period: u32) -> f64 {
        if holding_period >= 1 {
            self.long_term
        } else {
            self.short_term
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (label, rate) in [("short-term", self.short_term), ("long-term", self.long_term)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(CoreError::invalid(format!(
                    "{label} tax rate must be between 0 and 1, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Fee percentage per asset class, e.g. `0.5` for half a percent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeTable(BTreeMap<String, f64>);

impl FeeTable {
    pub fn total_percent(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn validate(&self) -> Result<()> {
        for (asset, fee) in &self.0 {
            if !fee.is_finite() || *fee < 0.0 {
                return Err(CoreError::invalid(format!(
                    "fee for '{asset}' must be >= 0, got {fee}"
                )));
            }
        }
        let total = self.total_percent();
        if total > 100.0 {
            return Err(CoreError::invalid(format!(
                "total fees must not exceed 100 percent, got {total}"
            )));
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeeTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(alias = "goal_amount")]
    pub goal_amount: f64,
    #[serde(alias = "timeline_years")]
    pub timeline_years: u32,
    #[serde(default)]
    pub priority: Priority,
}

impl Goal {
    pub fn validate(&self) -> Result<()> {
        if !self.goal_amount.is_finite() || self.goal_amount <= 0.0 {
            return Err(CoreError::invalid(format!(
                "goal amount must be > 0, got {}",
                self.goal_amount
            )));
        }
        if self.timeline_years < 1 {
            return Err(CoreError::invalid("timeline must be at least 1 year"));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationSettings {
    pub num_simulations: u32,
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_SIMULATIONS,
            seed: None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationTier {
    Achievable,
    MedianAboveGoal,
    NotOnTrack,
}

/// Distribution statistics for one goal amount.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feasibility {
    pub goal_amount: f64,
    pub success_probability: f64,
    pub median_projection: f64,
    pub projection_range: (f64, f64),
    pub tier: RecommendationTier,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityReport {
    pub initial_investment: f64,
    pub timeline_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(flatten)]
    pub feasibility: Feasibility,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiGoalOutcome {
    pub reports: BTreeMap<String, FeasibilityReport>,
    pub failures: BTreeMap<String, String>,
}

/// Everything one multi-goal run consumes; goals share `initial_investment`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    pub initial_investment: f64,
    pub goals: BTreeMap<String, Goal>,
    pub allocation: Allocation,
    pub asset_stats: AssetStats,
    pub tax_rates: TaxRates,
    pub fees: FeeTable,
    pub inflation_rate: f64,
    pub settings: SimulationSettings,
}

/// Gross single-goal check: no priority tilt, taxes, fees or inflation.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleGoalInputs {
    pub initial_investment: f64,
    pub goal_amount: f64,
    pub timeline_years: u32,
    pub allocation: Allocation,
    pub asset_stats: AssetStats,
    pub settings: SimulationSettings,
}
