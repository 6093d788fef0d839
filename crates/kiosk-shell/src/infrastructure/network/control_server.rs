//! Loopback HTTP control server.
//!
//! Local tools (session launchers, test harnesses, an operator's curl)
//! command the kiosk through a small POST-only JSON API bound to
//! `127.0.0.1`.  Every route translates into one display-controller call and
//! answers with a JSON echo of the accepted command, so the caller can
//! confirm exactly what was applied rather than just that the request
//! arrived.
//!
//! # Routes
//!
//! | Route                      | Effect                                     |
//! |----------------------------|--------------------------------------------|
//! | `POST /state`              | `set_state(body.state, body.params)`       |
//! | `POST /screensaver`        | `set_state("screensaver", {})`             |
//! | `POST /carescape`          | `set_state("carescape", body params)`      |
//! | `POST /in-session`, `/inSession` | `set_state("inSession", body params)` |
//! | `POST /goodbye`            | `set_state("goodbye", body params)`        |
//! | `POST /navigate`           | legacy `enter_destination(body.url)`       |
//! | `POST /splash`             | legacy `show_splash()`                     |
//! | `POST /status`             | snapshot + available states                |
//!
//! The shortcut routes accept either `{"params":{...}}` or a bare parameter
//! object as the body.
//!
//! # Error shape
//!
//! Scope is a trusted local network, so errors are terse JSON: a missing
//! required field answers 400 `{"error":"Missing <field> parameter"}`, an
//! unknown state answers 400 `{"error":"Unknown state: <name>"}`, a body
//! that does not parse answers the catch-all 500
//! `{"error":"Internal server error"}`, and an unknown path answers 404.
//! A bad request never takes the server down.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use url::Url;

use kiosk_core::StateParams;

use crate::application::display_controller::SCREENSAVER_STATE;
use crate::application::KioskContext;

type JsonObject = serde_json::Map<String, serde_json::Value>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the control server until the shutdown signal fires.
///
/// # Errors
///
/// Returns an error if the loopback listener cannot be bound (port already
/// in use, permissions) or the server fails while running.
pub async fn run_control_server(
    port: u16,
    ctx: Arc<KioskContext>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    // Loopback only: the control plane is never exposed off-machine.
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind control server on {addr}"))?;

    info!("HTTP control server listening on http://{addr}");

    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(async move {
            // Resolves on the shutdown signal, or on sender drop at teardown.
            let _ = shutdown.changed().await;
        })
        .await
        .context("control server failed")?;

    Ok(())
}

/// Builds the control-plane router.
///
/// Public so tests can drive it in-process with `tower::ServiceExt::oneshot`
/// instead of a real listener.
pub fn build_router(ctx: Arc<KioskContext>) -> Router {
    // Trusted local network: any origin may preflight, POST-only.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/state", post(set_state))
        .route("/screensaver", post(screensaver))
        .route("/carescape", post(carescape))
        .route("/in-session", post(in_session))
        .route("/inSession", post(in_session))
        .route("/goodbye", post(goodbye))
        .route("/navigate", post(navigate))
        .route("/splash", post(splash))
        .route("/status", post(status))
        .fallback(not_found)
        .layer(cors)
        .with_state(ctx)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn set_state(State(ctx): State<Arc<KioskContext>>, body: Bytes) -> Response {
    let data = match parse_object_strict(&body) {
        Ok(data) => data,
        Err(response) => return response,
    };

    let Some(state) = data.get("state").and_then(serde_json::Value::as_str) else {
        return json_error(StatusCode::BAD_REQUEST, "Missing state parameter");
    };
    let params = data
        .get("params")
        .and_then(serde_json::Value::as_object)
        .cloned()
        .unwrap_or_default();

    apply_state(&ctx, state, params).await
}

async fn screensaver(State(ctx): State<Arc<KioskContext>>) -> Response {
    // The screensaver shortcut never carries parameters.
    let mut controller = ctx.controller.lock().await;
    match controller.set_state(SCREENSAVER_STATE, StateParams::new()) {
        Ok(()) => ok_json(json!({ "success": true, "state": SCREENSAVER_STATE })),
        Err(e) => reject_unknown_state(SCREENSAVER_STATE, e),
    }
}

async fn carescape(State(ctx): State<Arc<KioskContext>>, body: Bytes) -> Response {
    shortcut(&ctx, "carescape", body).await
}

async fn in_session(State(ctx): State<Arc<KioskContext>>, body: Bytes) -> Response {
    shortcut(&ctx, "inSession", body).await
}

async fn goodbye(State(ctx): State<Arc<KioskContext>>, body: Bytes) -> Response {
    shortcut(&ctx, "goodbye", body).await
}

async fn navigate(State(ctx): State<Arc<KioskContext>>, body: Bytes) -> Response {
    let data = match parse_object_strict(&body) {
        Ok(data) => data,
        Err(response) => return response,
    };

    let Some(url_str) = data.get("url").and_then(serde_json::Value::as_str) else {
        return json_error(StatusCode::BAD_REQUEST, "Missing url parameter");
    };
    let url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(e) => {
            warn!("rejecting navigate to unparseable url '{url_str}': {e}");
            return json_error(StatusCode::BAD_REQUEST, "Invalid url parameter");
        }
    };

    ctx.controller.lock().await.enter_destination(url);
    ok_json(json!({ "success": true, "url": url_str }))
}

async fn splash(State(ctx): State<Arc<KioskContext>>) -> Response {
    ctx.controller.lock().await.show_splash();
    ok_json(json!({ "success": true, "state": SCREENSAVER_STATE }))
}

async fn status(State(ctx): State<Arc<KioskContext>>) -> Response {
    let controller = ctx.controller.lock().await;
    let snapshot = controller.snapshot();
    ok_json(json!({
        "success": true,
        "userType": snapshot.user_type,
        "currentState": snapshot.current_state,
        "stateParams": snapshot.current_params,
        "availableStates": controller.available_states(),
    }))
}

async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Not found")
}

// ── Request plumbing ──────────────────────────────────────────────────────────

/// Applies a state transition and builds the echo/error response shared by
/// `/state` and the shortcut routes.
async fn apply_state(ctx: &KioskContext, state: &str, params: StateParams) -> Response {
    let mut controller = ctx.controller.lock().await;
    match controller.set_state(state, params.clone()) {
        Ok(()) => ok_json(json!({ "success": true, "state": state, "params": params })),
        Err(e) => reject_unknown_state(state, e),
    }
}

/// Common body handling for the per-state shortcut routes.
async fn shortcut(ctx: &KioskContext, state: &str, body: Bytes) -> Response {
    let data = match parse_object_lenient(&body) {
        Ok(data) => data,
        Err(response) => return response,
    };
    apply_state(ctx, state, shortcut_params(data)).await
}

/// Strict parse for routes whose body is required: anything that is not a
/// JSON object gets the catch-all internal error, matching the established
/// control API contract.
fn parse_object_strict(body: &Bytes) -> Result<JsonObject, Response> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(data)) => Ok(data),
        Ok(_) | Err(_) => Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        )),
    }
}

/// Lenient parse for the shortcut routes: an empty body means no parameters.
fn parse_object_lenient(body: &Bytes) -> Result<JsonObject, Response> {
    if body.is_empty() {
        return Ok(JsonObject::new());
    }
    parse_object_strict(body)
}

/// Parameter map for a shortcut route: `body.params` when it is an object,
/// otherwise the body object itself.
fn shortcut_params(mut data: JsonObject) -> StateParams {
    match data.remove("params") {
        Some(serde_json::Value::Object(params)) => params,
        _ => data,
    }
}

fn ok_json(body: serde_json::Value) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn reject_unknown_state(state: &str, e: kiosk_core::UnknownStateError) -> Response {
    warn!("rejecting control request: {e}");
    json_error(StatusCode::BAD_REQUEST, &format!("Unknown state: {state}"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
