mod engine;
mod error;
mod types;

pub use engine::{MONTHS_PER_YEAR, TAX_RATE, compute_plan, resolve, summarize};
pub use error::{InputError, InputResult};
pub use types::{MAX_YEARS, PlanInputs, PlanSummary, YearlyRecord};
