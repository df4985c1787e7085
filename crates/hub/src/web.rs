use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use plantcare_analysis::dryness::{self, DrynessReport, ThresholdGuide};
use plantcare_analysis::ReadingSeries;

use crate::render::AnalysisOutput;
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/status", get(api_status))
        .route("/api/analyze", post(api_analyze))
        .route("/api/recommend", post(api_recommend))
        .route("/api/percentage/{value}", get(api_percentage))
        .route("/api/interpret/{value}", get(api_interpret))
        .route("/api/light/{minutes}", get(api_light))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct RecommendRequest {
    value: i64,
    #[serde(default)]
    rate: f64,
}

#[derive(Serialize)]
struct PercentageResponse {
    value: i64,
    percentage: f64,
}

#[derive(Serialize)]
struct InterpretResponse {
    report: DrynessReport,
    guide: ThresholdGuide,
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message })).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn api_status(State(state): State<SharedState>) -> impl IntoResponse {
    let st = state.read().await;
    Json(st.to_status())
}

/// Body is the raw JSON readings array; decoding happens here so a format
/// failure surfaces as a 400 carrying the decoder's message.
async fn api_analyze(State(state): State<SharedState>, body: String) -> Response {
    let series = match ReadingSeries::from_json(&body) {
        Ok(series) => series,
        Err(e) => {
            warn!(error = %e, "rejected analyze request");
            state.write().await.record_error(format!("analyze: {e}"));
            return bad_request(e.to_string());
        }
    };

    let analyzer = state.read().await.analyzer.clone();
    let summary = analyzer.analyze(&series);
    let recommendation = summary.report().map(|r| analyzer.recommend_for(r));

    let detail = match (summary.report(), &recommendation) {
        (Some(report), Some(rec)) => format!("{} -> {}", report.trend_type, rec.action),
        _ => "insufficient data".to_string(),
    };
    state.write().await.record_analysis(series.len(), detail);

    Json(AnalysisOutput {
        summary,
        recommendation,
    })
    .into_response()
}

async fn api_recommend(
    State(state): State<SharedState>,
    Json(req): Json<RecommendRequest>,
) -> Response {
    if !req.rate.is_finite() {
        return bad_request(format!("rate must be a finite number, got {}", req.rate));
    }

    let mut st = state.write().await;
    let rec = st.analyzer.recommend(req.value, req.rate);
    st.record_recommendation(format!("{} @ {}/h -> {}", req.value, req.rate, rec.action));
    Json(rec).into_response()
}

async fn api_percentage(
    State(state): State<SharedState>,
    Path(value): Path<i64>,
) -> impl IntoResponse {
    let st = state.read().await;
    Json(PercentageResponse {
        value,
        percentage: st.analyzer.to_percentage(value),
    })
}

async fn api_interpret(
    State(state): State<SharedState>,
    Path(value): Path<i64>,
) -> impl IntoResponse {
    let st = state.read().await;
    let calibration = st.analyzer.calibration();
    Json(InterpretResponse {
        report: dryness::interpret(calibration, value),
        guide: dryness::threshold_guide(calibration),
    })
}

async fn api_light(
    State(state): State<SharedState>,
    Path(minutes): Path<u32>,
) -> impl IntoResponse {
    let st = state.read().await;
    Json(st.light.remaining(minutes))
}

// ---------------------------------------------------------------------------
// Server entry-point
// ---------------------------------------------------------------------------

pub async fn serve(state: SharedState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind web port {port}"))?;

    state
        .write()
        .await
        .record_system(format!("listening on {addr}"));
    info!(%addr, "analysis api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("web server error")
}

// ===========================================================================
// Tests
// ===========================================================================
