use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use aura_ledger::{
    ChainValidator, Entry, EventRecord, LedgerReader, LedgerStats, LedgerWriter,
    ProjectionBuilder, ValidationReport,
};
use aura_types::{AnomalyClass, HealthEvent, SensorReading, Timestamp};

use crate::auth::Credentials;
use crate::error::ServerResult;
use crate::extract::JsonBody;
use crate::state::{AppState, ReadingNotice};

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info_handler(State(state): State<AppState>) -> ServerResult<Json<serde_json::Value>> {
    Ok(Json(json!({
        "name": "aura-server",
        "version": env!("CARGO_PKG_VERSION"),
        "entries": state.ledger.entry_count()?,
        "subjects": state.ledger.subjects()?.len(),
    })))
}

/// Rejects write requests the configured [`AuthProvider`](crate::AuthProvider)
/// does not accept.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> ServerResult<Response> {
    let identity = state
        .auth
        .authenticate(&Credentials::from_headers(&headers))
        .await?;
    tracing::trace!(?identity, "request authenticated");
    Ok(next.run(request).await)
}

/// Raw sensor aggregates posted by a device. Every field is required; they
/// are optional here so a missing one can be named in the 400 response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub temperature: Option<f64>,
    pub spo2: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub data: ReadingNotice,
}

pub async fn ingest_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<IngestRequest>,
) -> ServerResult<Json<IngestResponse>> {
    let reading = SensorReading::from_parts(
        body.heart_rate,
        body.respiratory_rate,
        body.temperature,
        body.spo2,
    )?;
    let notice = ReadingNotice {
        reading,
        received_at: Timestamp::now(),
    };

    // No subscribers is not an error.
    let delivered = state.readings.send(notice).unwrap_or(0);
    tracing::debug!(delivered, "sensor reading accepted");

    Ok(Json(IngestResponse {
        status: "ok",
        data: notice,
    }))
}

/// Body of `POST /v1/entries`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendRequest {
    pub subject_id: Option<String>,
    pub condition: Option<String>,
    pub anomaly_class: Option<AnomalyClass>,
    pub confidence: Option<f64>,
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub temperature: Option<f64>,
    pub spo2: Option<f64>,
    pub recorded_at: Option<Timestamp>,
}

impl AppendRequest {
    pub fn into_event(self) -> ServerResult<HealthEvent> {
        use aura_types::TypeError::MissingField;

        let reading = SensorReading::from_parts(
            self.heart_rate,
            self.respiratory_rate,
            self.temperature,
            self.spo2,
        )?;
        let mut event = HealthEvent::new(
            self.subject_id.ok_or(MissingField("subjectId"))?,
            self.condition.ok_or(MissingField("condition"))?,
            self.anomaly_class.ok_or(MissingField("anomalyClass"))?,
            self.confidence.ok_or(MissingField("confidence"))?,
            reading,
        );
        if let Some(ts) = self.recorded_at {
            event = event.at(ts);
        }
        event.validate()?;
        Ok(event)
    }
}

pub async fn append_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AppendRequest>,
) -> ServerResult<(StatusCode, Json<Entry>)> {
    let entry = state.ledger.append(body.into_event()?)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_handler(State(state): State<AppState>) -> ServerResult<Json<Vec<Entry>>> {
    Ok(Json(state.ledger.all_entries()?))
}

pub async fn subject_handler(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> ServerResult<Json<Vec<Entry>>> {
    Ok(Json(state.ledger.entries_by_subject(&subject_id)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub condition: String,
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ServerResult<Json<Vec<Entry>>> {
    Ok(Json(state.ledger.entries_by_condition(&params.condition)?))
}

pub async fn records_handler(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<EventRecord>>> {
    Ok(Json(ProjectionBuilder::records(state.ledger.as_ref())?))
}

pub async fn stats_handler(State(state): State<AppState>) -> ServerResult<Json<LedgerStats>> {
    Ok(Json(ProjectionBuilder::stats(
        state.ledger.as_ref(),
        Timestamp::now(),
    )?))
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub report: ValidationReport,
}

pub async fn verify_handler(State(state): State<AppState>) -> ServerResult<Json<VerifyResponse>> {
    let report = ChainValidator::validate(state.ledger.as_ref())?;
    if !report.is_valid() {
        tracing::warn!(violations = report.violations.len(), "ledger audit failed");
    }
    Ok(Json(VerifyResponse {
        valid: state.ledger.is_valid() && report.is_valid(),
        report,
    }))
}
