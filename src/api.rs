use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::assessment::RiskAssessment;
use crate::chatbot::{ChatEngine, SessionStore};
use crate::config::AppConfig;
use crate::estimator::{Estimator, FactorHandle};
use crate::history::AssessmentHistory;
use crate::profile::DemographicProfile;

#[derive(Clone)]
pub struct AppState {
    estimator: Arc<Estimator>,
    factors: Arc<FactorHandle>,
    chat: Arc<ChatEngine>,
    sessions: Arc<SessionStore>,
    history: Arc<AssessmentHistory>,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            estimator: Arc::new(Estimator::new(cfg.strategy, cfg.seed)),
            factors: Arc::new(FactorHandle::new(cfg.factors_path.as_deref())),
            chat: Arc::new(ChatEngine::load(cfg.chatbot_path.as_deref())),
            sessions: Arc::new(SessionStore::with_capacity(cfg.history_capacity)),
            history: Arc::new(AssessmentHistory::with_capacity(cfg.history_capacity)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/predict", post(predict))
        .route("/chatbot/session", post(chatbot_session))
        .route("/chatbot/message", post(chatbot_message))
        .route("/debug/history", get(debug_history))
        .route("/debug/last-assessment", get(debug_last_assessment))
        .route("/debug/factor", get(debug_factor))
        .route("/admin/reload-factors", get(admin_reload_factors))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Failure envelope shared by every endpoint.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

fn bad_request(error: String) -> Response {
    let body = ErrorBody {
        success: false,
        error,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Wire shape of a successful prediction, field-for-field what the browser
/// client consumes.
#[derive(Serialize)]
struct PredictResponse {
    success: bool,
    prediction: f64,
    risk_level: &'static str,
    risk_class: &'static str,
    confidence: f64,
    recommendation: String,
    condition_name: &'static str,
    condition_display: &'static str,
    user_inputs: DemographicProfile,
}

impl PredictResponse {
    fn from_assessment(a: RiskAssessment, profile: DemographicProfile) -> Self {
        Self {
            success: true,
            prediction: a.prevalence,
            risk_level: a.tier.as_str(),
            risk_class: a.tier.css_class(),
            confidence: a.confidence,
            recommendation: a.recommendation,
            condition_name: a.condition.name,
            condition_display: a.condition.display,
            user_inputs: profile,
        }
    }
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<DemographicProfile>, JsonRejection>,
) -> Response {
    let Json(profile) = match payload {
        Ok(p) => p,
        Err(rej) => return bad_request(rej.body_text()),
    };

    let tables = state.factors.current();
    let assessment = state.estimator.assess(&profile, &tables);
    state.history.push(&assessment);
    counter!("assessments_total", "tier" => assessment.tier.css_class()).increment(1);

    Json(PredictResponse::from_assessment(assessment, profile)).into_response()
}

#[derive(Serialize)]
struct SessionResponse {
    success: bool,
    session_id: String,
}

async fn chatbot_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session_id = state.sessions.create();
    Json(SessionResponse {
        success: true,
        session_id,
    })
}

#[derive(Deserialize)]
struct MessageRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
    session_id: String,
}

async fn chatbot_message(
    State(state): State<AppState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rej) => return bad_request(rej.body_text()),
    };

    let session_id = state.sessions.resolve_or_create(req.session_id.as_deref());
    let reply = state.chat.reply(&req.message);
    state.sessions.record_exchange(&session_id);
    counter!("chatbot_messages_total").increment(1);

    Json(MessageResponse {
        success: true,
        message: reply.text.to_string(),
        session_id,
    })
    .into_response()
}

#[derive(Serialize)]
struct HistoryOut {
    ts_unix: u64,
    risk_level: String,
    prevalence: f64,
    confidence: f64,
    condition: &'static str,
}

impl From<crate::history::AssessmentEntry> for HistoryOut {
    fn from(h: crate::history::AssessmentEntry) -> Self {
        Self {
            ts_unix: h.ts_unix,
            risk_level: h.tier.as_str().to_string(),
            prevalence: h.prevalence,
            confidence: h.confidence,
            condition: h.condition,
        }
    }
}

async fn debug_history(State(state): State<AppState>) -> Json<Vec<HistoryOut>> {
    let rows = state.history.snapshot_last_n(10);
    Json(rows.into_iter().map(HistoryOut::from).collect())
}

async fn debug_last_assessment(State(state): State<AppState>) -> Json<Option<HistoryOut>> {
    let mut rows = state.history.snapshot_last_n(1);
    Json(rows.pop().map(HistoryOut::from))
}

async fn debug_factor(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> String {
    let field = q.get("field").cloned().unwrap_or_default();
    let value = q.get("value").cloned().unwrap_or_default();
    let tables = state.factors.current();
    format!(
        "field='{}' value='{}' -> multiplier={:.2} delta={:+.2}",
        field,
        value,
        tables.multiplier(&field, &value),
        tables.delta(&field, &value)
    )
}

async fn admin_reload_factors(State(state): State<AppState>) -> String {
    if state.factors.force_reload() {
        "reloaded".to_string()
    } else {
        "no config file; embedded tables active".to_string()
    }
}
