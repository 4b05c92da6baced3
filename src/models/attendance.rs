use serde::Serialize;

/// One user's presence on one calendar day, joined with the display name.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub name: String,
    pub user_id: String,
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    /// Time of the first mark that day, `HH:MM:SS`
    pub time: String,
}

/// Outcome of an attendance mark attempt. Both variants are successes; the
/// kiosk routes to a different page per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkOutcome {
    /// First mark for this user today.
    Marked {
        name: String,
        date: String,
        time: String,
    },
    /// A mark for this user and day already exists.
    AlreadyMarked { name: String },
}

/// Point-in-time counters for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub total_users: u64,
    pub present_today: u64,
}
