//! Shared application state for all transports.
//!
//! `CoreState` owns the database path, the in-memory notification buffer,
//! and the suggestion service handle. Wrapped in `Arc` at startup so the
//! HTTP layer and background tasks share one instance.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

use crate::db;
use crate::suggest::SuggestionService;

/// Maximum buffered notifications before old ones are discarded.
const NOTIFICATION_BUFFER_CAPACITY: usize = 200;

pub struct CoreState {
    /// Path of the clinic SQLite database.
    pub db_path: PathBuf,
    /// Workflow notifications awaiting UI pickup.
    notifications: NotificationHub,
    /// Exclusive access to the text-generation backend.
    suggestion_service: SuggestionService,
    /// Last request timestamp (busy-indicator freshness).
    last_activity: Mutex<Instant>,
}

impl CoreState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            notifications: NotificationHub::new(),
            suggestion_service: SuggestionService::new(),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    /// Open a database connection. Opened per operation, the connection is
    /// dropped at the end of the handler; SQLite last-write-wins applies.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    /// Access the suggestion service for exclusive backend access.
    pub fn suggestions(&self) -> &SuggestionService {
        &self.suggestion_service
    }

    /// Buffer a workflow notification for the UI to drain.
    pub fn notify(&self, kind: NotificationKind, message: &str) {
        self.notifications.push(kind, message);
    }

    /// Drain all buffered notifications (consumed by the UI poll).
    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Update the last activity timestamp.
    pub fn update_activity(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Instant::now();
        }
    }

    /// Seconds since the last handled request.
    pub fn idle_secs(&self) -> u64 {
        self.last_activity
            .lock()
            .map(|last| last.elapsed().as_secs())
            .unwrap_or(0)
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

// ═══════════════════════════════════════════════════════════
// Notification hub
// ═══════════════════════════════════════════════════════════

/// What a buffered notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PatientCalled,
    SentToPharmacy,
    Dispensed,
}

/// A single workflow notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub kind: NotificationKind,
    pub message: String,
}

/// In-memory notification buffer. The UI drains it on poll; when it grows
/// past capacity the oldest entries are discarded.
struct NotificationHub {
    buffer: Mutex<Vec<Notification>>,
}

impl NotificationHub {
    fn new() -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, kind: NotificationKind, message: &str) {
        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() >= NOTIFICATION_BUFFER_CAPACITY {
                buf.remove(0);
            }
            buf.push(Notification {
                timestamp: chrono::Utc::now(),
                kind,
                message: message.to_string(),
            });
        }
    }

    fn drain(&self) -> Vec<Notification> {
        self.buffer
            .lock()
            .map(|mut buf| buf.drain(..).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> CoreState {
        CoreState::new(PathBuf::from(":memory:"))
    }

    #[test]
    fn notify_and_drain() {
        let state = test_state();
        state.notify(NotificationKind::SentToPharmacy, "Jane Doe sent to pharmacy");
        state.notify(NotificationKind::Dispensed, "Jane Doe dispensed");

        let drained = state.drain_notifications();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind, NotificationKind::SentToPharmacy);
        assert_eq!(drained[1].message, "Jane Doe dispensed");

        // Drained once, gone
        assert!(state.drain_notifications().is_empty());
    }

    #[test]
    fn buffer_discards_oldest_past_capacity() {
        let state = test_state();
        for i in 0..(NOTIFICATION_BUFFER_CAPACITY + 5) {
            state.notify(NotificationKind::PatientCalled, &format!("call {i}"));
        }
        let drained = state.drain_notifications();
        assert_eq!(drained.len(), NOTIFICATION_BUFFER_CAPACITY);
        assert_eq!(drained[0].message, "call 5");
    }

    #[test]
    fn update_activity_resets_idle() {
        let state = test_state();
        state.update_activity();
        assert_eq!(state.idle_secs(), 0);
    }

    #[test]
    fn notification_kind_serializes_snake_case() {
        let json = serde_json::to_string(&NotificationKind::SentToPharmacy).unwrap();
        assert_eq!(json, "\"sent_to_pharmacy\"");
    }
}
