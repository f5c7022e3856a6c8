mod api;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

// Internal imports
use crate::api::{ErrorResponse, QueryRequest};
use shopsage_core::client::{AnalysisClient, AnalysisOutcome};
use shopsage_core::config::ServiceConfig;
use shopsage_core::session::{EnvSessionSource, SessionResolver};

// 1. Define Application State
// Holds the two pipeline components: Resolver (Identity), Client (Backend).
// Both are read-only after startup, so concurrent requests share them with
// no locking.
#[derive(Clone)]
struct AppState {
    resolver: Arc<SessionResolver>,
    client: Arc<AnalysisClient>,
}

#[tokio::main]
async fn main() {
    // 2. Logging Setup
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .compact()
        .init();

    info!("ShopSage Gateway Initializing...");

    // 3. Resolve Configuration
    // This happens exactly once; nothing re-reads the environment later.
    let config = ServiceConfig::from_env();

    // 4. Initialize The Analysis Client (The Backend Line)
    let client = match AnalysisClient::new(&config) {
        Ok(c) => Arc::new(c),
        Err(e) => panic!("CRITICAL: Failed to initialize analysis client: {}", e),
    };

    // 5. Initialize The Session Resolver (The Identity Line)
    // The platform app-engine normally supplies the active session; this
    // deployment reads an injected one from the environment instead.
    let source = Arc::new(EnvSessionSource::from_env());
    let resolver = Arc::new(SessionResolver::new(source, &config));
    if config.allow_anonymous_fallback {
        warn!(
            "Anonymous fallback identity is ENABLED ({}). Disable it in production.",
            config.fallback_shop_domain
        );
    }

    // 6. Bundle State & Routes
    let state = AppState { resolver, client };
    let app = app(state);

    // 7. Start Server
    let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
    info!("Gateway listening on {}...", config.bind_addr);

    axum::serve(listener, app).await.unwrap();
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/queries", post(submit_query))
        .layer(TraceLayer::new_for_http())
        // The merchant client is an embedded app served from another origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// --- HANDLERS ---

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "shopsage gateway" }))
}

// The Pipeline Handler: validate -> resolve identity -> forward -> translate.
async fn submit_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Response {
    // STEP 1: VALIDATE (before touching the network)
    let question = payload.query.unwrap_or_default();
    if question.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "Question cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    // STEP 2: WHO IS ASKING? (The Resolver)
    // Active session if the app engine gave us one, else the configured
    // fallback identity when that is allowed.
    let Some(session) = state.resolver.resolve() else {
        warn!("Query rejected: no active session and fallback is disabled");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "No active session".to_string(),
            }),
        )
            .into_response();
    };

    info!("Shop '{}' asked: {}", session.shop_domain, question);

    // STEP 3: FORWARD (The Client) & STEP 4: TRANSLATE
    match state
        .client
        .analyze(&question, &session.shop_domain, &session.access_token)
        .await
    {
        AnalysisOutcome::Success { body } => (StatusCode::OK, Json(body)).into_response(),
        AnalysisOutcome::Failure { error_message } => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("AI Service failed: {}", error_message),
            }),
        )
            .into_response(),
    }
}
