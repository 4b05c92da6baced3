mod sqlite;

pub use sqlite::{AttendanceStore, StoreError};
