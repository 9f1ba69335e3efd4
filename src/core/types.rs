use serde::Serialize;

use super::error::{InputError, InputResult};

/// Longest plan accepted by [`PlanInputs::new`]; bounds the record buffer a
/// single projection allocates.
pub const MAX_YEARS: u32 = 1_000;

/// One row of a projection: the state of both accumulations at the end of `year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRecord {
    pub year: i32,
    pub investment_per_month: f64,
    pub gains: f64,
    pub with_investment: f64,
    pub without_investment: f64,
    pub tax: f64,
}

/// Plan parameters that passed validation.
///
/// Growth rates are fractions (`0.07` is +7%). Instances only come out of
/// [`PlanInputs::new`], so every value handed to the engine from here is
/// inside its precondition domain.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    years: u32,
    start_year: i32,
    start_capital: f64,
    contributions: Vec<f64>,
    growth_rates: Vec<f64>,
}

impl PlanInputs {
    pub fn new(
        years: u32,
        start_year: i32,
        start_capital: f64,
        contributions: Vec<f64>,
        growth_rates: Vec<f64>,
    ) -> InputResult<Self> {
        if years == 0 {
            return Err(InputError::NonPositiveYears);
        }
        if years > MAX_YEARS {
            return Err(InputError::TooManyYears {
                years,
                max: MAX_YEARS,
            });
        }
        if start_year.checked_add_unsigned(years).is_none() {
            return Err(InputError::YearOutOfRange { start_year, years });
        }

        if !start_capital.is_finite() || start_capital < 0.0 {
            return Err(InputError::NegativeStartCapital(start_capital));
        }

        if contributions.is_empty() {
            return Err(InputError::EmptyContributions);
        }
        if let Some((index, &value)) = contributions
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(InputError::NegativeContribution { index, value });
        }

        if growth_rates.is_empty() {
            return Err(InputError::EmptyGrowthRates);
        }
        if let Some((index, &value)) = growth_rates
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < -1.0)
        {
            return Err(InputError::GrowthRateBelowTotalLoss { index, value });
        }

        Ok(Self {
            years,
            start_year,
            start_capital,
            contributions,
            growth_rates,
        })
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn start_capital(&self) -> f64 {
        self.start_capital
    }

    /// Monthly amounts per period; the last one applies to all later years.
    pub fn contributions(&self) -> &[f64] {
        &self.contributions
    }

    /// Yearly growth fractions per period; the last one applies to all later years.
    pub fn growth_rates(&self) -> &[f64] {
        &self.growth_rates
    }
}

/// Headline figures taken from the final year of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub final_year: i32,
    pub final_value: f64,
    pub total_profit: f64,
    pub total_tax: f64,
}
