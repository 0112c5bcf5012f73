use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::models::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Like,
}

/// A notification record as stored in the `notification` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Thing,
    pub sender_id: String,
    pub receiver_id: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Content for a new `notification` record. `read` starts out false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub sender_id: String,
    pub receiver_id: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn new(sender_id: String, receiver_id: String, kind: NotificationKind) -> Self {
        Self {
            sender_id,
            receiver_id,
            kind,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
    pub sender: UserSummary,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Raw record id without the table prefix.
    pub fn raw_id(&self) -> String {
        self.id.id.to_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&NotificationKind::Follow).unwrap(),
            "\"follow\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationKind::Like).unwrap(),
            "\"like\""
        );
    }

    #[test]
    fn new_notification_starts_unread() {
        let notification = NewNotification::new(
            "sender".to_string(),
            "receiver".to_string(),
            NotificationKind::Like,
        );
        assert!(!notification.read);
    }
}
