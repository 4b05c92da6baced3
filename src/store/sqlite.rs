use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::models::{AttendanceRecord, MarkOutcome, Stats, User};

/// SQLite-backed store for users and attendance records.
///
/// Uniqueness rules (one user per `user_id`, one attendance row per
/// user and day) live in the schema, so concurrent writers racing past the
/// application still serialize at the database.
pub struct AttendanceStore {
    conn: Mutex<Connection>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User ID already exists")]
    DuplicateUserId,
    #[error("User not found")]
    UserNotFound,
    #[error("Database error: {0}")]
    Database(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl AttendanceStore {
    /// Open (or create) the database and ensure the schema exists.
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        // Create parent directories if needed
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                face_descriptor TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS attendance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                UNIQUE(user_id, date)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date)",
            [],
        )?;

        tracing::info!("Attendance store initialized with database: {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Liveness probe for the health endpoint.
    pub fn ping(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    /// Insert a new user. The UNIQUE constraint on `user_id` is the duplicate
    /// check; there is no read-before-write.
    pub fn register_user(
        &self,
        user_id: &str,
        name: &str,
        descriptor: &[f64],
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;

        let encoded =
            serde_json::to_string(descriptor).map_err(|e| StoreError::Database(e.to_string()))?;

        match conn.execute(
            "INSERT INTO users (user_id, name, face_descriptor) VALUES (?1, ?2, ?3)",
            params![user_id, name, encoded],
        ) {
            Ok(_) => {
                tracing::info!("Registered user {} ({})", user_id, name);
                Ok(())
            }
            Err(e) if is_constraint_violation(&e) => Err(StoreError::DuplicateUserId),
            Err(e) => Err(e.into()),
        }
    }

    /// Every enrolled user with its descriptor decoded back to a vector.
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT user_id, name, face_descriptor FROM users")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut users = Vec::new();
        for row in rows {
            let (user_id, name, encoded) = row?;
            let descriptor = serde_json::from_str(&encoded).map_err(|e| {
                StoreError::Database(format!("corrupt descriptor for {}: {}", user_id, e))
            })?;
            users.push(User {
                user_id,
                name,
                descriptor,
            });
        }
        Ok(users)
    }

    /// Remove a user. Attendance rows are left in place; the records join
    /// filters them out.
    pub fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
        if deleted == 0 {
            return Err(StoreError::UserNotFound);
        }

        tracing::info!("Deleted user {}", user_id);
        Ok(())
    }

    /// Record attendance for `user_id` on the given day. A second mark on the
    /// same day is a normal outcome, reported as `AlreadyMarked` when the
    /// insert hits the UNIQUE(user_id, date) constraint.
    pub fn mark_attendance(
        &self,
        user_id: &str,
        date: &str,
        time: &str,
    ) -> Result<MarkOutcome, StoreError> {
        let conn = self.lock()?;

        let name: Option<String> = conn
            .query_row(
                "SELECT name FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(name) = name else {
            return Err(StoreError::UserNotFound);
        };

        match conn.execute(
            "INSERT INTO attendance (user_id, date, time) VALUES (?1, ?2, ?3)",
            params![user_id, date, time],
        ) {
            Ok(_) => {
                tracing::info!("Marked attendance for {} on {} at {}", user_id, date, time);
                Ok(MarkOutcome::Marked {
                    name,
                    date: date.to_string(),
                    time: time.to_string(),
                })
            }
            Err(e) if is_constraint_violation(&e) => {
                tracing::debug!("Attendance for {} on {} already marked", user_id, date);
                Ok(MarkOutcome::AlreadyMarked { name })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All attendance records joined with user names, most recent first.
    /// Records whose user was deleted drop out of the inner join.
    pub fn list_records(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT u.name, u.user_id, a.date, a.time
             FROM attendance a
             JOIN users u ON a.user_id = u.user_id
             ORDER BY a.date DESC, a.time DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AttendanceRecord {
                name: row.get(0)?,
                user_id: row.get(1)?,
                date: row.get(2)?,
                time: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// User and present-today counts for the given calendar day.
    pub fn stats(&self, today: &str) -> Result<Stats, StoreError> {
        let conn = self.lock()?;

        let total_users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let present_today: i64 = conn.query_row(
            "SELECT COUNT(*) FROM attendance WHERE date = ?1",
            params![today],
            |row| row.get(0),
        )?;

        Ok(Stats {
            total_users: total_users as u64,
            present_today: present_today as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: [f64; 4] = [0.12, -0.5, 0.33, 0.999];

    fn store() -> AttendanceStore {
        AttendanceStore::new(":memory:").unwrap()
    }

    #[test]
    fn register_then_list_round_trips_descriptor() {
        let store = store();
        let descriptor = vec![0.123456789012345, -3.5e-7, 128.5, -0.25];
        store.register_user("emp-1", "Ada", &descriptor).unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_id, "emp-1");
        assert_eq!(users[0].name, "Ada");
        assert_eq!(users[0].descriptor, descriptor);
    }

    #[test]
    fn duplicate_user_id_is_rejected() {
        let store = store();
        store.register_user("emp-1", "Ada", &DESCRIPTOR).unwrap();

        let err = store
            .register_user("emp-1", "Grace", &DESCRIPTOR)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUserId));

        // First registration is untouched
        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ada");
    }

    #[test]
    fn mark_unknown_user_is_not_found() {
        let store = store();
        let err = store
            .mark_attendance("ghost", "2024-01-01", "10:00:00")
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound));
    }

    #[test]
    fn repeat_marks_on_same_day_report_exists() {
        let store = store();
        store.register_user("emp-1", "Ada", &DESCRIPTOR).unwrap();

        let first = store
            .mark_attendance("emp-1", "2024-01-01", "10:00:00")
            .unwrap();
        assert_eq!(
            first,
            MarkOutcome::Marked {
                name: "Ada".to_string(),
                date: "2024-01-01".to_string(),
                time: "10:00:00".to_string(),
            }
        );

        let second = store
            .mark_attendance("emp-1", "2024-01-01", "11:30:00")
            .unwrap();
        assert_eq!(
            second,
            MarkOutcome::AlreadyMarked {
                name: "Ada".to_string()
            }
        );

        let third = store
            .mark_attendance("emp-1", "2024-01-01", "17:45:00")
            .unwrap();
        assert_eq!(
            third,
            MarkOutcome::AlreadyMarked {
                name: "Ada".to_string()
            }
        );

        assert_eq!(store.list_records().unwrap().len(), 1);
    }

    #[test]
    fn marks_on_different_days_are_distinct_records() {
        let store = store();
        store.register_user("emp-1", "Ada", &DESCRIPTOR).unwrap();

        store
            .mark_attendance("emp-1", "2024-01-01", "10:00:00")
            .unwrap();
        let outcome = store
            .mark_attendance("emp-1", "2024-01-02", "09:00:00")
            .unwrap();
        assert!(matches!(outcome, MarkOutcome::Marked { .. }));

        assert_eq!(store.list_records().unwrap().len(), 2);
    }

    #[test]
    fn records_are_ordered_most_recent_first() {
        let store = store();
        store.register_user("emp-1", "Ada", &DESCRIPTOR).unwrap();
        store.register_user("emp-2", "Grace", &DESCRIPTOR).unwrap();

        store
            .mark_attendance("emp-1", "2024-01-01", "10:00:00")
            .unwrap();
        store
            .mark_attendance("emp-2", "2024-01-02", "09:00:00")
            .unwrap();
        store
            .mark_attendance("emp-1", "2024-01-02", "13:15:00")
            .unwrap();

        let records = store.list_records().unwrap();
        let keys: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.date.as_str(), r.time.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-02", "13:15:00"),
                ("2024-01-02", "09:00:00"),
                ("2024-01-01", "10:00:00"),
            ]
        );
    }

    #[test]
    fn stats_count_only_the_given_day() {
        let store = store();
        store.register_user("emp-1", "Ada", &DESCRIPTOR).unwrap();
        store.register_user("emp-2", "Grace", &DESCRIPTOR).unwrap();

        store
            .mark_attendance("emp-1", "2024-01-01", "10:00:00")
            .unwrap();
        store
            .mark_attendance("emp-1", "2024-01-02", "08:00:00")
            .unwrap();
        store
            .mark_attendance("emp-2", "2024-01-02", "09:00:00")
            .unwrap();

        let stats = store.stats("2024-01-02").unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.present_today, 2);

        let other_day = store.stats("2024-01-03").unwrap();
        assert_eq!(other_day.total_users, 2);
        assert_eq!(other_day.present_today, 0);
    }

    #[test]
    fn delete_user_leaves_orphan_records_out_of_listings() {
        let store = store();
        store.register_user("emp-1", "Ada", &DESCRIPTOR).unwrap();
        store
            .mark_attendance("emp-1", "2024-01-01", "10:00:00")
            .unwrap();

        store.delete_user("emp-1").unwrap();

        assert!(store.list_users().unwrap().is_empty());
        // The attendance row survives but the join hides it
        assert!(store.list_records().unwrap().is_empty());

        let err = store.delete_user("emp-1").unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound));
    }

    #[test]
    fn sqlite_url_prefix_and_parent_dirs_are_handled() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}/nested/attendance.db", dir.path().display());

        let store = AttendanceStore::new(&url).unwrap();
        store.register_user("emp-1", "Ada", &DESCRIPTOR).unwrap();

        assert_eq!(store.list_users().unwrap().len(), 1);
        assert!(dir.path().join("nested/attendance.db").exists());
    }
}
