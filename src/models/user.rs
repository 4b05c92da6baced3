use serde::Serialize;

/// Enrolled person, as returned by the users listing.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Externally supplied unique identifier
    pub user_id: String,
    /// Display name, not unique
    pub name: String,
    /// Face descriptor vector, stored verbatim and never interpreted
    pub descriptor: Vec<f64>,
}
