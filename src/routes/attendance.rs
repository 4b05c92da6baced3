//! Attendance ledger routes: marking, listing, stats.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{AttendanceRecord, MarkOutcome, Stats};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub user_id: Option<String>,
}

/// Outcome tag for a mark attempt. Both tags ride an HTTP 200; the kiosk
/// routes to a different success page per tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkStatus {
    Marked,
    Exists,
}

#[derive(Debug, Serialize)]
pub struct MarkAttendanceResponse {
    pub success: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub status: MarkStatus,
}

/// POST /api/mark_attendance - Record today's attendance for a user.
///
/// A repeat mark on the same day is not an error: the UNIQUE(user_id, date)
/// violation comes back as `status: "exists"` with date and time omitted.
async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<Json<MarkAttendanceResponse>, ApiError> {
    let user_id = req.user_id.unwrap_or_default();
    if user_id.is_empty() {
        return Err(ApiError::Validation("Missing User ID".to_string()));
    }

    // Server-local wall clock; date granularity is the calendar day
    let now = Local::now();
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();

    let response = match state.store.mark_attendance(&user_id, &date, &time)? {
        MarkOutcome::Marked { name, date, time } => MarkAttendanceResponse {
            success: true,
            name,
            date: Some(date),
            time: Some(time),
            status: MarkStatus::Marked,
        },
        MarkOutcome::AlreadyMarked { name } => MarkAttendanceResponse {
            success: true,
            name,
            date: None,
            time: None,
            status: MarkStatus::Exists,
        },
    };
    Ok(Json(response))
}

/// GET /api/records - All attendance records, most recent first.
async fn list_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    Ok(Json(state.store.list_records()?))
}

/// GET /api/stats - Counters for the admin dashboard.
async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<Stats>, ApiError> {
    let today = Local::now().format("%Y-%m-%d").to_string();
    Ok(Json(state.store.stats(&today)?))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mark_attendance", post(mark_attendance))
        .route("/records", get(list_records))
        .route("/stats", get(stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MarkStatus::Marked).unwrap(), "\"marked\"");
        assert_eq!(serde_json::to_string(&MarkStatus::Exists).unwrap(), "\"exists\"");
    }

    #[test]
    fn exists_response_omits_date_and_time() {
        let response = MarkAttendanceResponse {
            success: true,
            name: "Ada".to_string(),
            date: None,
            time: None,
            status: MarkStatus::Exists,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("date"));
        assert!(!json.contains("time"));
        assert!(json.contains(r#""status":"exists""#));
    }
}
