//! HTTP transport for the command surface.
//!
//! Every command route reads the caller identity from the
//! `X-Jobhound-Caller` header and answers with a JSON [`CommandReply`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info};

use jobhound_pipeline::Scheduler;

use crate::{CALLER_HEADER, CommandError, CommandReply, Commands};

/// Application state for the admin server.
pub struct AdminState {
    commands: Commands,
    /// Present when the server runs alongside a scheduler.
    scheduler: Option<Arc<Scheduler>>,
}

impl AdminState {
    pub fn new(commands: Commands) -> Self {
        Self {
            commands,
            scheduler: None,
        }
    }

    /// Allow `POST /commands/run` to trigger cycles on `scheduler`.
    pub fn with_scheduler(mut self, scheduler: Arc<Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }
}

/// Request body for value-setting commands.
#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    pub value: String,
}

/// Create an axum router for the admin server.
pub fn create_router(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/commands/link-method", post(handle_link_method))
        .route("/commands/location", post(handle_location))
        .route("/commands/query", post(handle_query))
        .route("/commands/settings", get(handle_settings))
        .route("/commands/run", post(handle_run))
        .with_state(state)
}

fn caller(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn respond(result: Result<CommandReply, CommandError>) -> (StatusCode, Json<CommandReply>) {
    match result {
        Ok(reply) => (StatusCode::OK, Json(reply)),
        Err(err) => {
            let status = match err {
                CommandError::Unauthorized => StatusCode::FORBIDDEN,
                CommandError::InvalidValue(_) => StatusCode::UNPROCESSABLE_ENTITY,
            };
            (status, Json(CommandReply::from(err)))
        }
    }
}

async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn handle_link_method(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    Json(request): Json<ValueRequest>,
) -> impl IntoResponse {
    respond(
        state
            .commands
            .set_link_method(caller(&headers), &request.value),
    )
}

async fn handle_location(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    Json(request): Json<ValueRequest>,
) -> impl IntoResponse {
    respond(
        state
            .commands
            .update_location(caller(&headers), &request.value),
    )
}

async fn handle_query(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    Json(request): Json<ValueRequest>,
) -> impl IntoResponse {
    respond(state.commands.update_query(caller(&headers), &request.value))
}

async fn handle_settings(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    respond(state.commands.show_settings(caller(&headers)))
}

/// Request an immediate cycle. Dropped if one is already running.
async fn handle_run(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Err(err) = state.commands.authorize(caller(&headers)) {
        return respond(Err(err));
    }

    let Some(scheduler) = &state.scheduler else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(CommandReply::error("No scheduler is attached.")),
        );
    };

    if scheduler.trigger() {
        debug!("manual cycle triggered");
        (StatusCode::OK, Json(CommandReply::success("Cycle started.")))
    } else {
        (
            StatusCode::OK,
            Json(CommandReply::error("A cycle is already running.")),
        )
    }
}

/// Run the admin server until `shutdown_rx` flips to true.
pub async fn run_server(
    state: Arc<AdminState>,
    port: u16,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("admin server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        })
        .await?;

    Ok(())
}
