use super::error::{CoreError, Result};
use super::types::{FeeTable, TaxRates};

/// Deducts fees, then tax on the gain of the post-fee value over the pre-fee value.
///
/// The gain is measured against the same pre-fee value rather than a cost basis.
/// With non-negative fees the tax term is zero for non-negative values; a negative
/// terminal value shrinks in magnitude under fees and that difference is taxed.
pub fn apply_taxes_and_fees(
    values: &[f64],
    tax_rates: &TaxRates,
    fees: &FeeTable,
    holding_period: u32,
) -> Vec<f64> {
    let tax_rate = tax_rates.rate_for(holding_period);
    let fee_fraction = fees.total_percent() / 100.0;

    values
        .iter()
        .map(|&value| {
            let after_fees = value * (1.0 - fee_fraction);
            let taxable_gain = (after_fees - value).max(0.0);
            after_fees - taxable_gain * tax_rate
        })
        .collect()
}

/// Discounts nominal values to purchasing power at the start of the horizon.
pub fn adjust_for_inflation(values: &[f64], inflation_rate: f64, years: u32) -> Vec<f64> {
    let deflator = (1.0 + inflation_rate).powf(years as f64);
    values.iter().map(|v| v / deflator).collect()
}

/// Fee/tax deduction on nominal values followed by inflation discounting.
pub fn net_projections(
    values: &[f64],
    tax_rates: &TaxRates,
    fees: &FeeTable,
    inflation_rate: f64,
    holding_period: u32,
) -> Vec<f64> {
    let after_tax = apply_taxes_and_fees(values, tax_rates, fees, holding_period);
    adjust_for_inflation(&after_tax, inflation_rate, holding_period)
}

pub fn validate_inflation_rate(inflation_rate: f64) -> Result<()> {
    if !inflation_rate.is_finite() || inflation_rate <= -1.0 {
        return Err(CoreError::invalid(format!(
            "inflation rate must be > -1, got {inflation_rate}"
        )));
    }
    Ok(())
}
