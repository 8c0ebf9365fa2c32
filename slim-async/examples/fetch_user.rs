//! Fetch a user through an async descriptor and watch the three actions.
//!
//! Run with `RUST_LOG=debug` to see the middleware and action log output.

use std::time::Duration;

use serde_json::{json, Value};
use slim_async::prelude::*;
use slim_async::ActionLogConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
struct AppState {
    loading: bool,
    user: Option<String>,
    error: Option<String>,
}

fn reducer(state: &mut AppState, action: FluxAction) -> bool {
    match action.kind() {
        Some("USER_PENDING") => {
            state.loading = true;
            state.error = None;
            true
        }
        Some("USER_SUCCESS") => {
            state.loading = false;
            state.user = action
                .payload()
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .map(String::from);
            true
        }
        Some("USER_ERROR") => {
            state.loading = false;
            state.error = action
                .payload()
                .and_then(|p| p.get("message"))
                .and_then(Value::as_str)
                .map(String::from);
            true
        }
        _ => false,
    }
}

async fn fetch_user(id: u64) -> Result<Value, ApiError> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    match id {
        7 => Ok(json!({ "user": { "name": "Ada Lovelace" } })),
        _ => Err(ApiError::new("user not found").with_data(json!({ "status": 404 }))),
    }
}

fn load_user(id: u64) -> AsyncAction<AppState> {
    AsyncAction::new()
        .kind("USER")
        .payload(json!({ "id": id }))
        .should_call_api(|state: &AppState| !state.loading)
        .call_api(move || fetch_user(id))
        .format_data(|response| response["user"].clone())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let logger = ActionLoggerMiddleware::with_log(ActionLogConfig::new(
        20,
        ActionLoggerConfig::new(Some("USER_*"), None),
    ));
    let store = AsyncStore::new(
        SharedStore::new(AppState::default(), reducer, logger),
        AsyncMiddleware::with_options(Options::conventional()),
    );

    if let Some(request) = store.dispatch(load_user(7))?.into_request() {
        let state = request.await?;
        tracing::info!(user = ?state.user, "loaded");
    }

    if let Some(request) = store.dispatch(load_user(8))?.into_request() {
        if let Err(error) = request.await {
            tracing::info!(%error, state = ?store.state(), "failed");
        }
    }

    store.store().with_middleware(|logger| {
        if let Some(log) = logger.log() {
            for entry in log.entries() {
                println!(
                    "#{:<2} {:<14} error={:<5} {}",
                    entry.sequence, entry.name, entry.error, entry.summary
                );
            }
        }
    });

    Ok(())
}
