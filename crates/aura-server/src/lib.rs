//! HTTP boundary for the Aura health event ledger.
//!
//! Accepts sensor readings and health events over JSON, serves queries,
//! projections, and chain verification. Write endpoints are guarded by a
//! shared-secret header when an API key is configured.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AllowAllAuth, AuthProvider, Credentials, Identity, SharedSecretAuth};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::AuraServer;
pub use state::{AppState, ReadingNotice};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aura_ledger::{FixedClock, Ledger, LedgerReader};
    use aura_types::Timestamp;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::*;

    const NOW: Timestamp = Timestamp::from_millis(1_714_564_800_000);

    fn server(api_key: Option<&str>) -> AuraServer {
        let config = ServerConfig {
            api_key: api_key.map(str::to_string),
            ..ServerConfig::default()
        };
        let ledger = Ledger::seeded_with_clock(FixedClock::new(NOW)).unwrap();
        AuraServer::with_ledger(config, Arc::new(ledger))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        read(response).await
    }

    async fn post(app: Router, uri: &str, body: Value, key: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(key) = key {
            request = request.header(auth::API_KEY_HEADER, key);
        }
        let response = app
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        read(response).await
    }

    async fn read(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn event_body() -> Value {
        json!({
            "subjectId": "U777",
            "condition": "Fatigue",
            "anomalyClass": "Warning",
            "confidence": 0.81,
            "heartRate": 88.0,
            "respiratoryRate": 18.0,
            "temperature": 37.1,
            "spo2": 96.0
        })
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get(server(None).router(), "/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (status, body) = get(server(None).router(), "/v1/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "aura-server");
        assert_eq!(body["entries"], 10);
    }

    #[tokio::test]
    async fn list_returns_genesis_first() {
        let (status, body) = get(server(None).router(), "/v1/entries").await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0]["sequenceNumber"], 0);
        assert_eq!(entries[0]["payload"]["subjectId"], "SYSTEM");
        assert_eq!(entries[1]["previousDigest"], entries[0]["digest"]);
    }

    #[tokio::test]
    async fn subject_and_search_endpoints() {
        let server = server(None);

        let (_, by_subject) = get(server.router(), "/v1/entries/subject/U12345").await;
        assert_eq!(by_subject.as_array().unwrap().len(), 9);

        let (_, unknown) = get(server.router(), "/v1/entries/subject/NOBODY").await;
        assert_eq!(unknown, json!([]));

        let (status, found) = get(server.router(), "/v1/entries/search?condition=stress").await;
        assert_eq!(status, StatusCode::OK);
        let found = found.as_array().unwrap();
        assert!(!found.is_empty());
        assert!(found.iter().all(|e| e["payload"]["condition"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("stress")));
    }

    #[tokio::test]
    async fn append_then_query() {
        let server = server(None);
        let (status, entry) = post(server.router(), "/v1/entries", event_body(), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["sequenceNumber"], 10);

        let head = server.state().ledger.head().unwrap().unwrap();
        assert_eq!(entry["digest"], head.digest().to_hex());

        let (_, by_subject) = get(server.router(), "/v1/entries/subject/U777").await;
        assert_eq!(by_subject.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_missing_field_is_bad_request() {
        let mut body = event_body();
        body.as_object_mut().unwrap().remove("spo2");
        let (status, err) = post(server(None).router(), "/v1/entries", body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].as_str().unwrap().contains("spo2"));
    }

    #[tokio::test]
    async fn malformed_bodies_get_json_errors() {
        let server = server(None);

        let request = Request::builder()
            .method("POST")
            .uri("/v1/entries")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, err) = read(server.router().oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed request body"));

        let mut body = event_body();
        body["heartRate"] = json!("fast");
        let (status, err) = post(server.router(), "/v1/entries", body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].is_string());

        let request = Request::builder()
            .method("POST")
            .uri("/v1/ingest")
            .body(Body::from("{}"))
            .unwrap();
        let (status, err) = read(server.router().oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].is_string());

        assert_eq!(server.state().ledger.entry_count().unwrap(), 10);
    }

    #[tokio::test]
    async fn ingest_publishes_reading() {
        let server = server(None);
        let mut rx = server.state().subscribe();
        let body = json!({
            "heartRate": 72.0,
            "respiratoryRate": 16.0,
            "temperature": 36.8,
            "spo2": 98.0
        });

        let (status, echoed) = post(server.router(), "/v1/ingest", body, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(echoed["status"], "ok");
        assert_eq!(echoed["data"]["heartRate"], 72.0);

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.reading.spo2, 98.0);
        // Ingestion does not touch the ledger.
        assert_eq!(server.state().ledger.entry_count().unwrap(), 10);
    }

    #[tokio::test]
    async fn ingest_missing_field_is_bad_request() {
        let body = json!({ "heartRate": 72.0, "temperature": 36.8, "spo2": 98.0 });
        let (status, err) = post(server(None).router(), "/v1/ingest", body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].as_str().unwrap().contains("respiratoryRate"));
    }

    #[tokio::test]
    async fn writes_require_api_key_when_configured() {
        let server = server(Some("s3cret"));

        let (status, _) = post(server.router(), "/v1/entries", event_body(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            post(server.router(), "/v1/entries", event_body(), Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            post(server.router(), "/v1/entries", event_body(), Some("s3cret")).await;
        assert_eq!(status, StatusCode::CREATED);

        // Reads stay open.
        let (status, _) = get(server.router(), "/v1/entries").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn records_and_stats() {
        let server = server(None);

        let (_, records) = get(server.router(), "/v1/records").await;
        let records = records.as_array().unwrap();
        assert_eq!(records.len(), 9);
        assert_eq!(records[0]["entryId"], 9);

        let (status, stats) = get(server.router(), "/v1/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalEvents"], 9);
        assert_eq!(stats["dailyTrend"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn verify_reports_valid_chain() {
        let (status, body) = get(server(None).router(), "/v1/verify").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["report"]["entryCount"], 10);
        assert_eq!(body["report"]["violations"], json!([]));
    }
}
