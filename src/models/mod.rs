pub mod attendance;
pub mod user;

pub use attendance::{AttendanceRecord, MarkOutcome, Stats};
pub use user::User;
