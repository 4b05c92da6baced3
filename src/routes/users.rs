//! Identity store routes: registration, listing, deletion.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::User;
use crate::AppState;

/// Request body for registration. All three fields are required; they are
/// declared optional so absence surfaces as a 400 rather than a decode error.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub descriptor: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
}

/// POST /api/register - Enroll a user with a face descriptor.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let name = req.name.unwrap_or_default();
    let user_id = req.user_id.unwrap_or_default();
    let descriptor = req.descriptor.unwrap_or_default();

    if name.is_empty() || user_id.is_empty() || descriptor.is_empty() {
        return Err(ApiError::Validation("Missing data".to_string()));
    }

    state.store.register_user(&user_id, &name, &descriptor)?;
    Ok(Json(RegisterResponse { success: true }))
}

/// GET /api/users - Every enrolled user with its descriptor, for the
/// client-side matching index.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.store.list_users()?))
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /api/delete_user/:user_id - Remove a user and its face data.
/// Attendance rows stay behind and disappear from listings via the join.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    state.store.delete_user(&user_id)?;
    Ok(Json(DeleteUserResponse {
        success: true,
        message: format!("User {} deleted successfully", user_id),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/users", get(list_users))
        .route("/delete_user/:user_id", delete(delete_user))
        .with_state(state)
}
