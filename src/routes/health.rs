use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use chrono::Local;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = if state.store.ping().is_ok() {
        "ok"
    } else {
        "error"
    };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let today = Local::now().format("%Y-%m-%d").to_string();
    let stats = state.store.stats(&today).unwrap_or_default();
    let body = format!(
        "# HELP faceattendance_up Whether the service is up\n\
         # TYPE faceattendance_up gauge\n\
         faceattendance_up 1\n\
         # HELP faceattendance_users_total Enrolled users\n\
         # TYPE faceattendance_users_total gauge\n\
         faceattendance_users_total {}\n\
         # HELP faceattendance_present_today Users marked present today\n\
         # TYPE faceattendance_present_today gauge\n\
         faceattendance_present_today {}\n",
        stats.total_users, stats.present_today
    );
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}
