pub mod attendance;
pub mod health;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router(state.clone()))
        .nest(
            "/api",
            users::router(state.clone()).merge(attendance::router(state)),
        )
}
