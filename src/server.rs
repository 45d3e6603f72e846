//!
//! procgate HTTP server
//! --------------------
//! This module defines the Axum-based JSON API over the procedure gateway.
//!
//! Responsibilities:
//! - Grouped procedure listing used to build input forms.
//! - Per-procedure descriptor and invocation endpoints.
//! - Catalog scan endpoint exposing stored procedure definitions.
//! - Uniform `{"status": ...}` envelopes; classified errors map to HTTP
//!   statuses and panics on the execution path become 500 responses instead
//!   of killing the server task.
//!
//! The handlers hold no gateway logic of their own: they resolve the
//! identifier against the registry, delegate to the gateway or the catalog
//! inspector, and serialize the outcome.

use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use std::panic::AssertUnwindSafe;
use futures_util::FutureExt; // for catch_unwind on async blocks

use crate::catalog;
use crate::error::GatewayError;
use crate::gateway::{self, ConnectSettings};
use crate::registry::{self, ProcGroup};

/// Shared server state injected into all handlers. Holds only the immutable
/// connection settings; every operation opens and owns its own connection.
#[derive(Clone)]
pub struct AppState {
    pub settings: ConnectSettings,
}

/// Start the procgate HTTP server with port and database settings taken from
/// the environment.
pub async fn run() -> anyhow::Result<()> {
    let http_port: u16 = std::env::var("PROCGATE_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(7878);
    run_with_port(http_port, ConnectSettings::from_env()).await
}

/// Start the procgate HTTP server bound to the given port, invoking against
/// the given database settings.
pub async fn run_with_port(http_port: u16, settings: ConnectSettings) -> anyhow::Result<()> {
    let state = AppState { settings };

    let app = Router::new()
        .route("/", get(|| async { "procgate ok" }))
        .route("/procedures", get(list_procedures))
        .route("/proc/{name}", get(describe_procedure).post(invoke_procedure))
        .route("/source-code", get(source_code))
        .with_state(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(err: &GatewayError) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({"status":"error","code": err.code_str(),"message": err.message()})),
    )
}

fn unknown_procedure(name: &str) -> GatewayError {
    GatewayError::not_found("unknown_procedure", format!("procedure '{}' is not registered", name))
}

/// Full registry, grouped for form building.
async fn list_procedures() -> impl IntoResponse {
    let groups: Vec<serde_json::Value> = ProcGroup::ALL
        .iter()
        .map(|g| {
            let procedures: Vec<serde_json::Value> = registry::in_group(*g)
                .map(|d| json!({"name": d.name, "title": d.title, "params": d.params}))
                .collect();
            json!({"group": g.as_str(), "label": g.label(), "procedures": procedures})
        })
        .collect();
    (StatusCode::OK, Json(json!({"status":"ok","groups": groups})))
}

/// One descriptor, enough to render an input form for the procedure.
async fn describe_procedure(Path(name): Path<String>) -> impl IntoResponse {
    match registry::lookup(&name) {
        Some(def) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "name": def.name,
                "title": def.title,
                "group": def.group.as_str(),
                "params": def.params,
            })),
        ),
        None => error_response(&unknown_procedure(&name)),
    }
}

#[derive(Deserialize)]
struct InvokePayload {
    /// Raw submitted values, positionally aligned with the descriptor's
    /// parameter labels.
    #[serde(default)]
    values: Vec<String>,
}

async fn invoke_procedure(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<InvokePayload>,
) -> impl IntoResponse {
    // Unknown identifiers are resolved here, before any database work.
    let Some(def) = registry::lookup(&name) else {
        return error_response(&unknown_procedure(&name));
    };

    let exec_fut = async { gateway::invoke(&state.settings, def, &payload.values).await };
    match AssertUnwindSafe(exec_fut).catch_unwind().await {
        Ok(Ok(outcome)) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "title": def.title,
                "tables": outcome.tables,
                "messages": outcome.messages,
            })),
        ),
        Ok(Err(e)) => {
            error!(target: "http", procedure = def.name, "invocation failed: {}", e);
            error_response(&e)
        }
        Err(panic_payload) => {
            // Convert panics to a 500 error response without crashing the server task
            let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() { *s }
                      else if let Some(s) = panic_payload.downcast_ref::<String>() { s.as_str() }
                      else { "panic" };
            error!(target: "panic", "invoke handler panic: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status":"error","code":"internal_panic","message":"internal server error"})),
            )
        }
    }
}

/// Catalog scan: per-procedure stored definitions, in registry order.
async fn source_code(State(state): State<AppState>) -> impl IntoResponse {
    match catalog::inspect_all(&state.settings).await {
        Ok(entries) => (StatusCode::OK, Json(json!({"status":"ok","procedures": entries}))),
        Err(e) => {
            error!(target: "http", "catalog scan failed: {}", e);
            error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn listing_covers_every_registered_procedure() {
        let resp = list_procedures().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = body_json(resp).await;
        assert_eq!(v["status"], "ok");
        let groups = v["groups"].as_array().unwrap();
        assert_eq!(groups.len(), 4);
        let total: usize = groups
            .iter()
            .map(|g| g["procedures"].as_array().unwrap().len())
            .sum();
        assert_eq!(total, registry::all().len());
    }

    #[tokio::test]
    async fn describe_returns_descriptor_fields() {
        let resp = describe_procedure(Path("GetTopAndBottomProducts".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = body_json(resp).await;
        assert_eq!(v["name"], "GetTopAndBottomProducts");
        assert_eq!(v["group"], "reports");
        assert_eq!(v["params"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn describe_unknown_is_not_found() {
        let resp = describe_procedure(Path("NoSuchProc".to_string())).await.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let v = body_json(resp).await;
        assert_eq!(v["status"], "error");
        assert_eq!(v["code"], "unknown_procedure");
    }

    #[tokio::test]
    async fn invoke_unknown_is_rejected_before_any_database_work() {
        // Settings point at a closed port; resolving the identifier must fail
        // first, without ever attempting a connection.
        let state = AppState {
            settings: ConnectSettings {
                host: "127.0.0.1".into(),
                port: 1,
                user: "postgres".into(),
                password: String::new(),
                dbname: "cyber_management".into(),
            },
        };
        let resp = invoke_procedure(
            State(state),
            Path("NoSuchProc".to_string()),
            Json(InvokePayload { values: vec![] }),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let v = body_json(resp).await;
        assert_eq!(v["code"], "unknown_procedure");
    }

    #[tokio::test]
    async fn invoke_reports_system_error_when_database_is_unreachable() {
        let state = AppState {
            settings: ConnectSettings {
                host: "127.0.0.1".into(),
                port: 1,
                user: "postgres".into(),
                password: String::new(),
                dbname: "cyber_management".into(),
            },
        };
        let resp = invoke_procedure(
            State(state),
            Path("EndSession".to_string()),
            Json(InvokePayload { values: vec!["S-001".to_string()] }),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v = body_json(resp).await;
        assert_eq!(v["status"], "error");
        assert_eq!(v["code"], "connect_error");
    }
}
