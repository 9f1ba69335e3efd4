use thiserror::Error;

pub type InputResult<T> = Result<T, InputError>;

/// Reasons a set of plan parameters is rejected before projection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("years to invest must be greater than 0")]
    NonPositiveYears,

    #[error("years to invest cannot exceed {max} (got {years})")]
    TooManyYears { years: u32, max: u32 },

    #[error("plan starting in {start_year} and running {years} years ends past the last representable year")]
    YearOutOfRange { start_year: i32, years: u32 },

    #[error("initial investment cannot be negative (got {0})")]
    NegativeStartCapital(f64),

    #[error("at least one monthly investment amount is required")]
    EmptyContributions,

    #[error("monthly investment amounts cannot be negative (index {index}: {value})")]
    NegativeContribution { index: usize, value: f64 },

    #[error("at least one yearly gain rate is required")]
    EmptyGrowthRates,

    #[error("gain percentages cannot be less than -100% (index {index}: {value})")]
    GrowthRateBelowTotalLoss { index: usize, value: f64 },
}
