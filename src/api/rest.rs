// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. `/health` is public; every other route
// takes the `AuthBearer` extractor, which is a no-op unless an API token is
// configured.
//
// Engine and provider failures map onto HTTP statuses through `ApiError`:
//   InvalidInput    -> 400
//   DataUnavailable -> 502
//   Config          -> 500
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info, warn, Level};

use crate::api::auth::AuthBearer;
use crate::app_state::{AnalysisRecord, AppState};
use crate::error::EngineError;
use crate::indicators::IndicatorOverlay;
use crate::market_data::CandleSeries;
use crate::runtime_config::RuntimeConfig;
use crate::signals::analyze;
use crate::types::{Interval, Market};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS, request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        // ── Token-gated when configured ─────────────────────────────
        .route("/api/v1/price", get(price))
        .route("/api/v1/signal", get(signal))
        .route("/api/v1/indicators", get(indicators))
        .route("/api/v1/signals/recent", get(recent_signals))
        // ── Middleware & State ───────────────────────────────────────
        .layer(trace)
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

/// `EngineError` rendered as `{error, kind}` with a matching status code.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::DataUnavailable { .. } => StatusCode::BAD_GATEWAY,
            EngineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, %status, "request failed");
        } else {
            warn!(error = %self.0, %status, "request rejected");
        }
        let body = serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Query parameters
// =============================================================================

/// Raw `?symbol=&market=&interval=` parameters. Blank values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct AssetQuery {
    pub symbol: Option<String>,
    pub market: Option<String>,
    pub interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub symbol: String,
    pub market: Market,
    pub interval: Interval,
}

impl AssetQuery {
    /// Fill absent parameters from configuration and parse the rest.
    pub fn resolve(self, config: &RuntimeConfig) -> Result<ResolvedQuery, EngineError> {
        fn present(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }

        let symbol = present(self.symbol).unwrap_or_else(|| config.default_symbol.clone());
        let market = match present(self.market) {
            Some(m) => m.parse()?,
            None => config.default_market,
        };
        let interval = match present(self.interval) {
            Some(i) => i.parse()?,
            None => config.default_interval,
        };
        Ok(ResolvedQuery {
            symbol,
            market,
            interval,
        })
    }
}

async fn fetch_series(state: &AppState, query: AssetQuery) -> Result<CandleSeries, EngineError> {
    let q = query.resolve(&state.runtime_config)?;
    state
        .market_data
        .fetch_candles(&q.symbol, q.market, q.interval)
        .await
}

// =============================================================================
// Health (public)
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    analyses_served: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_secs(),
        analyses_served: state.analyses_served(),
    })
}

// =============================================================================
// Price history
// =============================================================================

async fn price(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<CandleSeries>, ApiError> {
    let series = fetch_series(&state, query).await?;
    debug!(symbol = %series.symbol, candles = series.candles.len(), "price served");
    Ok(Json(series))
}

// =============================================================================
// Signal
// =============================================================================

async fn signal(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let series = fetch_series(&state, query).await?;
    let signal = analyze(&series.candles)?;
    let last_price = series.last_close();

    let record = AnalysisRecord::new(
        series.symbol,
        series.market,
        series.interval,
        signal,
        last_price,
    );
    info!(
        id = %record.id,
        symbol = %record.symbol,
        direction = %record.signal.direction,
        confidence = record.signal.confidence,
        "signal generated"
    );

    state.push_analysis(record.clone());
    Ok(Json(record))
}

// =============================================================================
// Indicator overlay
// =============================================================================

#[derive(Serialize)]
struct IndicatorsResponse {
    symbol: String,
    market: Market,
    interval: Interval,
    overlay: IndicatorOverlay,
}

async fn indicators(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<IndicatorsResponse>, ApiError> {
    let series = fetch_series(&state, query).await?;
    let overlay = IndicatorOverlay::from_closes(&series.closes());
    Ok(Json(IndicatorsResponse {
        symbol: series.symbol,
        market: series.market,
        interval: series.interval,
        overlay,
    }))
}

// =============================================================================
// Recent signals
// =============================================================================

async fn recent_signals(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(state.recent_analyses())
}

// =============================================================================
// Tests
// =============================================================================
