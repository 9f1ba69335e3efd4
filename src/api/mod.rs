use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Datelike, Utc};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{InputError, InputResult, PlanInputs, PlanSummary, YearlyRecord, summarize};

mod render;
mod snapshot;

pub use render::{format_currency, format_percent, render_table};
pub use snapshot::{
    ImportError, PlanSnapshot, SNAPSHOT_VERSION, default_export_file_name, import_inputs,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum PayloadError {
    #[error("{field} contains a value that is not a number: '{value}'")]
    BadRowValue { field: &'static str, value: String },

    #[error(transparent)]
    Input(#[from] InputError),
}

#[derive(Parser, Debug)]
#[command(
    name = "invest-plan",
    about = "Year-by-year compound investment projection against a no-growth baseline"
)]
pub struct Cli {
    #[arg(
        long,
        required_unless_present = "import",
        help = "Number of years to invest after the start year"
    )]
    years: Option<u32>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "First calendar year of the plan, defaults to the current year"
    )]
    start_year: Option<i32>,
    #[arg(long, default_value_t = 0.0, help = "Initial one-time investment")]
    start_capital: f64,
    #[arg(
        long = "contribution",
        value_delimiter = ',',
        default_values_t = [0.0],
        allow_negative_numbers = true,
        help = "Monthly investment per period, repeatable; the last value applies to all later years"
    )]
    contributions: Vec<f64>,
    #[arg(
        long = "growth-rate",
        value_delimiter = ',',
        default_values_t = [0.0],
        allow_negative_numbers = true,
        help = "Yearly gain per period in percent, repeatable; the last value applies to all later years"
    )]
    growth_rates: Vec<f64>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Load parameters from a snapshot document instead of the flags above"
    )]
    import: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Write a snapshot document of the effective parameters"
    )]
    export: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RowField {
    List(Vec<f64>),
    Csv(String),
}

impl RowField {
    fn into_values(self, field: &'static str) -> Result<Vec<f64>, PayloadError> {
        match self {
            RowField::List(values) => Ok(values),
            RowField::Csv(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<f64>().map_err(|_| PayloadError::BadRowValue {
                        field,
                        value: part.to_string(),
                    })
                })
                .collect(),
        }
    }
}

/// Plan parameters as sent by the web page; growth rates are in percent.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    years_to_invest: Option<u32>,
    start_year: Option<i32>,
    start_money: Option<f64>,
    investment_per_month_row: Option<RowField>,
    increase_row: Option<RowField>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    start_money: f64,
    years: Vec<YearlyRecord>,
    summary: Option<PlanSummary>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn current_year() -> i32 {
    Utc::now().year()
}

fn build_inputs(cli: &Cli) -> InputResult<PlanInputs> {
    PlanInputs::new(
        cli.years.unwrap_or(0),
        cli.start_year.unwrap_or_else(current_year),
        cli.start_capital,
        cli.contributions.clone(),
        cli.growth_rates.iter().map(|pct| pct / 100.0).collect(),
    )
}

/// Runs one projection from the command line and prints the result.
pub fn run_cli(cli: Cli) -> Result<(), CliError> {
    let output = execute_cli(&cli, Utc::now())?;
    print!("{output}");
    Ok(())
}

fn execute_cli(cli: &Cli, now: DateTime<Utc>) -> Result<String, CliError> {
    let inputs = match &cli.import {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            let inputs = import_inputs(&raw)?;
            info!("imported plan parameters from {}", path.display());
            inputs
        }
        None => build_inputs(cli)?,
    };

    if let Some(path) = &cli.export {
        let document = PlanSnapshot::from_inputs(&inputs, now).to_json_pretty()?;
        fs::write(path, document).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        info!("exported plan parameters to {}", path.display());
    }

    let records = inputs.project();
    debug!(
        "projected {} years from {}",
        inputs.years(),
        inputs.start_year()
    );

    match cli.format {
        OutputFormat::Table => Ok(render_table(&inputs, &records)),
        OutputFormat::Json => {
            let response = build_plan_response(&inputs, records);
            Ok(format!("{}\n", serde_json::to_string_pretty(&response)?))
        }
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .route("/api/export", post(export_handler))
        .route("/api/import", post(import_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("investment plan HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_get_handler(payload: Result<Query<PlanPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => plan_handler_impl(payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

async fn plan_post_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => plan_handler_impl(payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

fn rejected_payload(reason: &str) -> Response {
    warn!("rejected undecodable plan payload: {reason}");
    error_response(StatusCode::BAD_REQUEST, reason)
}

fn plan_handler_impl(payload: PlanPayload) -> Response {
    let inputs = match inputs_from_payload(payload, current_year()) {
        Ok(inputs) => inputs,
        Err(err) => {
            warn!("rejected plan request: {err}");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    let records = inputs.project();
    debug!("computed plan with {} records", records.len());
    json_response(StatusCode::OK, build_plan_response(&inputs, records))
}

async fn export_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return rejected_payload(&rejection.body_text()),
    };
    match inputs_from_payload(payload, current_year()) {
        Ok(inputs) => export_response(&inputs, Utc::now()),
        Err(err) => {
            warn!("rejected export request: {err}");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

async fn import_handler(body: String) -> Response {
    match import_inputs(&body) {
        Ok(inputs) => {
            info!(
                "imported snapshot: {} years from {}",
                inputs.years(),
                inputs.start_year()
            );
            let records = inputs.project();
            json_response(StatusCode::OK, build_plan_response(&inputs, records))
        }
        Err(err) => {
            warn!("rejected snapshot import: {err}");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn export_response(inputs: &PlanInputs, now: DateTime<Utc>) -> Response {
    let snapshot = PlanSnapshot::from_inputs(inputs, now);
    let mut response = json_response(StatusCode::OK, snapshot);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        default_export_file_name(now.date_naive())
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str, default_year: i32) -> Result<PlanInputs, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload, default_year).map_err(|e| e.to_string())
}

fn inputs_from_payload(
    payload: PlanPayload,
    default_year: i32,
) -> Result<PlanInputs, PayloadError> {
    let mut cli = default_cli_for_api(default_year);

    if let Some(v) = payload.years_to_invest {
        cli.years = Some(v);
    }
    if let Some(v) = payload.start_year {
        cli.start_year = Some(v);
    }
    if let Some(v) = payload.start_money {
        cli.start_capital = v;
    }
    if let Some(v) = payload.investment_per_month_row {
        cli.contributions = v.into_values("investmentPerMonthRow")?;
    }
    if let Some(v) = payload.increase_row {
        cli.growth_rates = v.into_values("increaseRow")?;
    }

    Ok(build_inputs(&cli)?)
}

/// Blank form state of the web page.
fn default_cli_for_api(default_year: i32) -> Cli {
    Cli {
        years: Some(0),
        start_year: Some(default_year),
        start_capital: 0.0,
        contributions: vec![0.0],
        growth_rates: vec![0.0],
        import: None,
        export: None,
        format: OutputFormat::Json,
    }
}

fn build_plan_response(inputs: &PlanInputs, records: Vec<YearlyRecord>) -> PlanResponse {
    PlanResponse {
        start_money: inputs.start_capital(),
        summary: summarize(&records),
        years: records,
    }
}
