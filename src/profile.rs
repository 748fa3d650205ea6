//! Investor risk scoring and the allocation heuristic built on it.
//!
//! Produces a plain [`Allocation`] for callers that do not bring their own.

use serde::Deserialize;

use crate::core::{Allocation, BONDS, CRYPTO, REAL_ESTATE, STOCKS};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeStability {
    Stable,
    Moderate,
    Unstable,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorProfile {
    pub age: u32,
    #[serde(alias = "income_stability")]
    pub income_stability: IncomeStability,
    #[serde(alias = "risk_tolerance")]
    pub risk_tolerance: RiskTolerance,
}

impl IncomeStability {
    fn factor(self) -> f64 {
        match self {
            IncomeStability::Stable => 1.0,
            IncomeStability::Moderate => 0.75,
            IncomeStability::Unstable => 0.5,
        }
    }
}

impl RiskTolerance {
    fn factor(self) -> f64 {
        match self {
            RiskTolerance::Low => 0.5,
            RiskTolerance::Medium => 0.75,
            RiskTolerance::High => 1.0,
        }
    }
}

/// Risk capacity in `[0, 1]`; younger, steadier, more tolerant investors score higher.
pub fn risk_score(profile: &InvestorProfile) -> f64 {
    let age_factor = 100_u32.saturating_sub(profile.age) as f64 / 100.0;
    let score = age_factor * profile.income_stability.factor() * profile.risk_tolerance.factor();
    (score * 100.0).round() / 100.0
}

/// Tilts a 40/30/20/10 stocks/bonds/real-estate/crypto base by risk score and
/// benchmark sentiment, then normalizes to percentages rounded to two decimals.
pub fn dynamic_allocation(risk_score: f64, market_sentiment: f64) -> Allocation {
    let mut stocks = 0.4;
    let mut bonds = 0.3;
    let mut real_estate = 0.2;
    let mut crypto = 0.1;

    if market_sentiment > 0.0 {
        stocks += risk_score * 0.1;
    }
    bonds -= (1.0 - risk_score) * 0.1;
    if risk_score > 0.7 {
        crypto += 0.05;
    }
    if risk_score < 0.5 {
        real_estate -= 0.05;
    }

    let total = stocks + bonds + real_estate + crypto;
    [
        (STOCKS, stocks),
        (BONDS, bonds),
        (REAL_ESTATE, real_estate),
        (CRYPTO, crypto),
    ]
    .into_iter()
    .map(|(asset, weight)| (asset, (weight / total * 10_000.0).round() / 100.0))
    .collect()
}
