pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use config::Config;
pub use error::ApiError;
pub use models::{AttendanceRecord, MarkOutcome, Stats, User};
pub use store::AttendanceStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: AttendanceStore,
}
