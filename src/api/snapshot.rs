use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{InputError, PlanInputs};

pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("invalid snapshot document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported snapshot version '{0}' (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion(String),

    #[error("snapshot holds invalid plan parameters: {0}")]
    Invalid(#[from] InputError),
}

/// Save/restore document for a plan's parameters.
///
/// Growth rates are stored in percent, the way they are entered, and
/// converted to fractions on the way back into [`PlanInputs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    pub years_to_invest: u32,
    pub start_year: i32,
    pub start_money: f64,
    pub investment_per_month_row: Vec<f64>,
    pub increase_row: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PlanSnapshot {
    pub fn from_inputs(inputs: &PlanInputs, exported_at: DateTime<Utc>) -> Self {
        Self {
            years_to_invest: inputs.years(),
            start_year: inputs.start_year(),
            start_money: inputs.start_capital(),
            investment_per_month_row: inputs.contributions().to_vec(),
            increase_row: inputs.growth_rates().iter().map(|r| r * 100.0).collect(),
            exported_at: Some(exported_at),
            version: Some(SNAPSHOT_VERSION.to_string()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a document and checks its version marker. Field values are not
    /// range-checked until [`PlanSnapshot::into_inputs`].
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let snapshot: PlanSnapshot = serde_json::from_str(json)?;
        if let Some(version) = snapshot.version.as_deref() {
            if version.split('.').next() != Some("1") {
                return Err(ImportError::UnsupportedVersion(version.to_string()));
            }
        }
        Ok(snapshot)
    }

    pub fn into_inputs(self) -> Result<PlanInputs, ImportError> {
        let growth_rates = self.increase_row.iter().map(|pct| pct / 100.0).collect();
        let inputs = PlanInputs::new(
            self.years_to_invest,
            self.start_year,
            self.start_money,
            self.investment_per_month_row,
            growth_rates,
        )?;
        Ok(inputs)
    }
}

/// Parses and validates in one step; nothing is produced unless both succeed.
pub fn import_inputs(json: &str) -> Result<PlanInputs, ImportError> {
    PlanSnapshot::from_json(json)?.into_inputs()
}

pub fn default_export_file_name(date: NaiveDate) -> String {
    format!("investment-calculator-{}.json", date.format("%Y-%m-%d"))
}
