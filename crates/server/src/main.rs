// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono_tz::Tz;
use chronograph_domain::{DomainError, PlanningConfig};
use chronograph_engine::{Engine, EngineConfig, EngineError, HttpTenderApi, TokioJobScheduler};
use chronograph_persistence::{CalendarStore, MemoryCalendarStore, SqliteCalendarStore};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Chronograph Server - drives tender lifecycles against a remote API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base url of the tender collection endpoint.
    #[arg(long)]
    api_url: String,

    /// Basic-auth token for the tender API.
    #[arg(long, default_value = "")]
    api_token: String,

    /// This server's own base url, pushed-to by deferred callbacks.
    /// Defaults to the bind address.
    #[arg(long)]
    callback_url: Option<String>,

    /// Path to the `SQLite` calendar database. If not provided, uses
    /// in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// IANA timezone all planning arithmetic runs in.
    #[arg(long, default_value = "Europe/Kyiv")]
    timezone: String,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The resync engine the callback endpoints drive.
    engine: Arc<Engine>,
}

/// API response for a single-tender resync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResyncResponse {
    /// The tender that was re-evaluated.
    tender_id: String,
    /// Whether a patch was written back.
    patched: bool,
    /// When the tender is next due, RFC 3339, if armed.
    next_check: Option<String>,
}

/// Query parameters for the full resync sweep.
#[derive(Debug, Deserialize)]
struct ResyncAllQuery {
    /// Feed cursor to resume from; absent means start of feed.
    url: Option<String>,
}

/// API response for the full resync sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResyncAllResponse {
    /// The cursor the next sweep will resume from.
    next_cursor: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<EngineError> for HttpError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Transport(_) | EngineError::RetriesExhausted { .. } => Self {
                status: StatusCode::BAD_GATEWAY,
                message: err.to_string(),
            },
            EngineError::Core(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: err.to_string(),
            },
        }
    }
}

/// Handler for GET `/resync/{tender_id}` endpoint.
///
/// Re-evaluates one tender and re-arms its next callback.
async fn handle_resync(
    AxumState(app_state): AxumState<AppState>,
    Path(tender_id): Path<String>,
) -> Result<Json<ResyncResponse>, HttpError> {
    info!(tender_id = %tender_id, "Handling resync request");

    let outcome = app_state.engine.resync_tender(&tender_id).await?;

    outcome.map_or_else(
        || {
            Err(HttpError {
                status: StatusCode::BAD_GATEWAY,
                message: format!("Tender {tender_id} could not be fetched"),
            })
        },
        |outcome| {
            Ok(Json(ResyncResponse {
                tender_id: tender_id.clone(),
                patched: outcome.patched,
                next_check: outcome.next_check.map(|t| t.to_rfc3339()),
            }))
        },
    )
}

/// Handler for GET `/resync_all` endpoint.
///
/// Walks the tender feed, arming an immediate resync callback per
/// tender, and re-arms itself with the cursor it stopped at.
async fn handle_resync_all(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ResyncAllQuery>,
) -> Json<ResyncAllResponse> {
    info!(cursor = ?query.url, "Handling resync_all request");

    let next_cursor = app_state.engine.resync_tenders(query.url.as_deref()).await;

    Json(ResyncAllResponse { next_cursor })
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/resync/{tender_id}", get(handle_resync))
        .route("/resync_all", get(handle_resync_all))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Chronograph Server");

    let tz: Tz = args
        .timezone
        .parse()
        .map_err(|_| DomainError::InvalidTimezone(args.timezone.clone()))?;
    let planning: PlanningConfig = PlanningConfig::new(tz);

    // Initialize the calendar store (in-memory or file-based based on
    // CLI argument)
    let store: Arc<dyn CalendarStore> = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Arc::new(SqliteCalendarStore::new_with_file(db_path)?)
    } else {
        info!("Using in-memory database");
        Arc::new(MemoryCalendarStore::new())
    };

    let callback_url: String = args
        .callback_url
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", args.port));

    let http: reqwest::Client = reqwest::Client::new();
    let config: EngineConfig = EngineConfig::default();
    let api: Arc<HttpTenderApi> = Arc::new(HttpTenderApi::new(
        http.clone(),
        &args.api_url,
        args.api_token,
    ));
    let scheduler: Arc<TokioJobScheduler> = Arc::new(TokioJobScheduler::new(
        http,
        config.misfire_grace,
        chronograph_engine::RetryPolicy::unbounded(config.push_backoff),
    ));

    let engine: Arc<Engine> = Arc::new(Engine::new(
        api,
        store,
        scheduler,
        planning,
        config,
        &callback_url,
        args.api_url.clone(),
    ));

    // The feed walk self-starts from this one armed job.
    engine.arm_initial_sweep();

    let app_state: AppState = AppState { engine };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use chronograph_engine::RetryPolicy;
    use tower::ServiceExt;

    /// Helper to build an app whose transport points at an unroutable
    /// API with a single-attempt retry policy.
    fn create_test_app() -> Router {
        let http: reqwest::Client = reqwest::Client::new();
        let api = HttpTenderApi::new(http.clone(), "http://127.0.0.1:9/tenders", String::new())
            .with_get_retry(RetryPolicy::limited(
                1,
                std::time::Duration::from_millis(10),
            ));
        let config: EngineConfig = EngineConfig::default();
        let scheduler = TokioJobScheduler::new(
            http,
            config.misfire_grace,
            RetryPolicy::limited(1, std::time::Duration::from_millis(10)),
        );
        let planning: PlanningConfig = PlanningConfig::new(Tz::Europe__Kyiv);

        let engine: Arc<Engine> = Arc::new(Engine::new(
            Arc::new(api),
            Arc::new(MemoryCalendarStore::new()),
            Arc::new(scheduler),
            planning,
            config,
            "http://127.0.0.1:3000",
            String::from("http://127.0.0.1:9/tenders"),
        ));

        build_router(AppState { engine })
    }

    #[tokio::test]
    async fn test_resync_unreachable_api_returns_bad_gateway() {
        let app: Router = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/resync/abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::BAD_GATEWAY);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body_bytes).unwrap();

        assert!(error_response.error);
    }

    #[tokio::test]
    async fn test_resync_all_always_answers_with_a_cursor() {
        let app: Router = create_test_app();

        // The feed is unreachable; the sweep stops immediately but
        // still hands back the cursor it would resume from.
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/resync_all?url=http://127.0.0.1:9/tenders?offset=42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let sweep_response: ResyncAllResponse = serde_json::from_slice(&body_bytes).unwrap();

        assert_eq!(
            sweep_response.next_cursor,
            "http://127.0.0.1:9/tenders?offset=42"
        );
    }

    #[tokio::test]
    async fn test_resync_all_without_cursor_starts_from_feed() {
        let app: Router = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/resync_all")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let sweep_response: ResyncAllResponse = serde_json::from_slice(&body_bytes).unwrap();

        assert_eq!(sweep_response.next_cursor, "http://127.0.0.1:9/tenders");
    }
}
