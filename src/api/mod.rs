use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::core::{
    AssetStat, AssetStats, Allocation, CoreError, FeeTable, Goal, PlanInputs, Priority,
    SimulationSettings, SingleGoalInputs, TaxRates, check_goal_feasibility, evaluate_all,
};
use crate::profile::{InvestorProfile, dynamic_allocation, risk_score};
use crate::report::Report;

/// Sentiment assumed when a profile-derived allocation has no sentiment input.
pub const DEFAULT_MARKET_SENTIMENT: f64 = 0.05;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, &self.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Copy, Clone, Debug)]
pub struct ApiLimits {
    pub max_simulations: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluatePayload {
    initial_investment: Option<f64>,
    goals: Option<BTreeMap<String, Goal>>,
    allocation: Option<Allocation>,
    investor: Option<InvestorProfile>,
    market_sentiment: Option<f64>,
    asset_stats: Option<AssetStats>,
    tax_rates: Option<TaxRates>,
    fees: Option<FeeTable>,
    inflation_rate: Option<f64>,
    simulations: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SingleGoalPayload {
    initial_investment: Option<f64>,
    goal_amount: Option<f64>,
    timeline_years: Option<u32>,
    allocation: Option<Allocation>,
    investor: Option<InvestorProfile>,
    market_sentiment: Option<f64>,
    asset_stats: Option<AssetStats>,
    simulations: Option<u32>,
    seed: Option<u64>,
}

impl EvaluatePayload {
    pub fn override_settings(&mut self, simulations: Option<u32>, seed: Option<u64>) {
        self.simulations = simulations.or(self.simulations);
        self.seed = seed.or(self.seed);
    }
}

impl SingleGoalPayload {
    pub fn override_settings(&mut self, simulations: Option<u32>, seed: Option<u64>) {
        self.simulations = simulations.or(self.simulations);
        self.seed = seed.or(self.seed);
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn plan_from_payload(payload: EvaluatePayload, limits: ApiLimits) -> ApiResult<PlanInputs> {
    let allocation = resolve_allocation(
        payload.allocation,
        payload.investor,
        payload.market_sentiment,
    );
    Ok(PlanInputs {
        initial_investment: payload.initial_investment.unwrap_or(1_000_000.0),
        goals: payload.goals.unwrap_or_else(default_goals),
        allocation,
        asset_stats: payload.asset_stats.unwrap_or_else(default_asset_stats),
        tax_rates: payload.tax_rates.unwrap_or_else(default_tax_rates),
        fees: payload.fees.unwrap_or_else(default_fees),
        inflation_rate: payload.inflation_rate.unwrap_or(0.05),
        settings: resolve_settings(payload.simulations, payload.seed, limits)?,
    })
}

pub fn single_goal_from_payload(
    payload: SingleGoalPayload,
    limits: ApiLimits,
) -> ApiResult<SingleGoalInputs> {
    let allocation = resolve_allocation(
        payload.allocation,
        payload.investor,
        payload.market_sentiment,
    );
    Ok(SingleGoalInputs {
        initial_investment: payload.initial_investment.unwrap_or(50_000.0),
        goal_amount: payload.goal_amount.unwrap_or(150_000.0),
        timeline_years: payload.timeline_years.unwrap_or(10),
        allocation,
        asset_stats: payload.asset_stats.unwrap_or_else(default_asset_stats),
        settings: resolve_settings(payload.simulations, payload.seed, limits)?,
    })
}

fn resolve_allocation(
    allocation: Option<Allocation>,
    investor: Option<InvestorProfile>,
    market_sentiment: Option<f64>,
) -> Allocation {
    match (allocation, investor) {
        (Some(allocation), _) => allocation,
        (None, Some(investor)) => dynamic_allocation(
            risk_score(&investor),
            market_sentiment.unwrap_or(DEFAULT_MARKET_SENTIMENT),
        ),
        (None, None) => default_allocation(),
    }
}

fn resolve_settings(
    simulations: Option<u32>,
    seed: Option<u64>,
    limits: ApiLimits,
) -> ApiResult<SimulationSettings> {
    let defaults = SimulationSettings::default();
    let num_simulations = simulations.unwrap_or(defaults.num_simulations);
    if num_simulations > limits.max_simulations {
        return Err(ApiError::BadRequest(format!(
            "simulations must be <= {}",
            limits.max_simulations
        )));
    }
    Ok(SimulationSettings {
        num_simulations,
        seed,
    })
}

pub fn default_goals() -> BTreeMap<String, Goal> {
    BTreeMap::from([
        (
            "House".to_string(),
            Goal {
                goal_amount: 2_000_000.0,
                timeline_years: 15,
                priority: Priority::High,
            },
        ),
        (
            "Retirement".to_string(),
            Goal {
                goal_amount: 10_000_000.0,
                timeline_years: 30,
                priority: Priority::Medium,
            },
        ),
        (
            "Education".to_string(),
            Goal {
                goal_amount: 1_000_000.0,
                timeline_years: 10,
                priority: Priority::Low,
            },
        ),
    ])
}

pub fn default_allocation() -> Allocation {
    [("stocks", 50.0), ("bonds", 30.0), ("real_estate", 10.0), ("crypto", 10.0)]
        .into_iter()
        .collect()
}

pub fn default_asset_stats() -> AssetStats {
    [
        ("stocks", 0.12, 0.18),
        ("bonds", 0.04, 0.05),
        ("real_estate", 0.07, 0.12),
        ("crypto", 0.15, 0.25),
    ]
    .into_iter()
    .map(|(asset, annualized_return, annualized_volatility)| {
        (
            asset,
            AssetStat {
                annualized_return,
                annualized_volatility,
            },
        )
    })
    .collect()
}

pub fn default_tax_rates() -> TaxRates {
    TaxRates {
        short_term: 0.15,
        long_term: 0.10,
    }
}

pub fn default_fees() -> FeeTable {
    [("stocks", 0.5), ("bonds", 0.2), ("real_estate", 0.3), ("crypto", 0.8)]
        .into_iter()
        .collect()
}

pub fn run_plan(payload: EvaluatePayload, limits: ApiLimits) -> ApiResult<Report> {
    let inputs = plan_from_payload(payload, limits)?;
    Ok(Report::multi(evaluate_all(&inputs)?))
}

pub fn run_single_goal(payload: SingleGoalPayload, limits: ApiLimits) -> ApiResult<Report> {
    let inputs = single_goal_from_payload(payload, limits)?;
    Ok(Report::single(check_goal_feasibility(&inputs)?))
}

pub fn router(limits: ApiLimits) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/goals/evaluate", post(evaluate_goals_handler))
        .route("/api/goal/evaluate", post(evaluate_goal_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(limits))
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let app = router(ApiLimits {
        max_simulations: config.max_simulations,
    });

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!("goal evaluation API listening on http://{}", config.listen_addr);

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn evaluate_goals_handler(
    State(limits): State<Arc<ApiLimits>>,
    payload: Result<Json<EvaluatePayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    let limits = *limits;
    let report = tokio::task::spawn_blocking(move || run_plan(payload, limits))
        .await
        .map_err(|e| ApiError::Internal(format!("evaluation task failed: {e}")))??;
    Ok(json_response(StatusCode::OK, report))
}

async fn evaluate_goal_handler(
    State(limits): State<Arc<ApiLimits>>,
    payload: Result<Json<SingleGoalPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    let limits = *limits;
    let report = tokio::task::spawn_blocking(move || run_single_goal(payload, limits))
        .await
        .map_err(|e| ApiError::Internal(format!("evaluation task failed: {e}")))??;
    Ok(json_response(StatusCode::OK, report))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
