//! HTTP webhook gateway for Orderbot.
//!
//! Exposes the LINE webhook endpoint plus liveness and health checks.
//! Every text event in a webhook body is dispatched independently; the
//! endpoint answers 200 once all of them reached a terminal outcome
//! (reply sent, reply failed and logged, or deliberate silence).
//!
//! Built on Axum for high performance async HTTP.

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

use orderbot_channels::{LineMessenger, SIGNATURE_HEADER, SignatureVerifier, WebhookPayload};
use orderbot_config::AppConfig;
use orderbot_core::{InboundMessage, Messenger, RowSource};
use orderbot_dispatch::Dispatcher;
use orderbot_sheets::GoogleSheetsSource;

/// Shared application state for the gateway. Read-only after startup.
pub struct GatewayState {
    pub dispatcher: Dispatcher,
    pub messenger: Arc<dyn Messenger>,
    pub verifier: SignatureVerifier,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl GatewayState {
    pub fn new(
        dispatcher: Dispatcher,
        messenger: Arc<dyn Messenger>,
        verifier: SignatureVerifier,
    ) -> Self {
        Self {
            dispatcher,
            messenger,
            verifier,
            started_at: chrono::Utc::now(),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, webhook_path: &str) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route(webhook_path, post(webhook_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Builds the Google Sheets source, the dispatcher and the LINE messenger
/// once; every request shares them read-only.
pub async fn start(config: AppConfig) -> orderbot_core::Result<()> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let source: Arc<dyn RowSource> = Arc::new(GoogleSheetsSource::from_config(&config.sheet)?);
    let dispatcher = Dispatcher::new(&config, source)?;
    let messenger: Arc<dyn Messenger> = Arc::new(LineMessenger::from_config(&config.line)?);
    let verifier = SignatureVerifier::new(config.line.channel_secret.clone());

    if !verifier.is_enabled() {
        warn!("line.channel_secret is not set, webhook signatures will NOT be verified");
    }
    if !messenger.health_check().await? {
        warn!("line.channel_access_token is not set, replies will fail");
    }

    let state = Arc::new(GatewayState::new(dispatcher, messenger, verifier));
    let app = build_router(state, &config.gateway.webhook_path);

    info!(addr = %addr, webhook = %config.gateway.webhook_path, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

async fn root_handler() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
    })
}

async fn webhook_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = state.verifier.verify(&body, signature) {
        warn!(error = %e, "Rejected webhook");
        return StatusCode::UNAUTHORIZED;
    }

    let payload = match WebhookPayload::parse(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Malformed webhook body");
            return StatusCode::BAD_REQUEST;
        }
    };

    let messages = payload.text_messages();
    debug!(
        events = payload.events.len(),
        text_messages = messages.len(),
        "Webhook received"
    );

    for message in messages {
        let span = info_span!("event", id = %uuid::Uuid::new_v4());
        handle_message(&state, message).instrument(span).await;
    }

    StatusCode::OK
}

/// Dispatch one text message and send its reply, if any. Never fails.
async fn handle_message(state: &GatewayState, message: InboundMessage) {
    let Some(reply) = state.dispatcher.dispatch(&message.text).await else {
        return;
    };

    if let Err(e) = state.messenger.reply(&message.reply_token, &reply).await {
        error!(
            messenger = state.messenger.name(),
            error = %e,
            "Reply delivery failed"
        );
    }
}
