use crate::{
    error::{AppError, Result},
    models::notification::*,
    models::user::{User, UserSummary},
    services::Database,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Notification recorder. Appends follow/like notifications and serves the
/// receiver-side list, read-marking and deletion operations.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
}

impl NotificationService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn record(&self, notification: NewNotification) -> Result<Notification> {
        let id = Uuid::new_v4().to_string();
        let created: Notification = self
            .db
            .create_with_id("notification", &id, notification)
            .await?;
        debug!(
            "Recorded {:?} notification from {} to {}",
            created.kind, created.sender_id, created.receiver_id
        );
        Ok(created)
    }

    /// List the receiver's notifications with sender identities resolved,
    /// then mark them all read.
    pub async fn list_for(&self, receiver_id: &str) -> Result<Vec<NotificationResponse>> {
        let mut response = self
            .db
            .query_with_params(
                "SELECT * FROM notification WHERE receiver_id = $receiver ORDER BY created_at DESC",
                json!({ "receiver": receiver_id }),
            )
            .await?;
        let notifications: Vec<Notification> = response.take(0)?;

        let sender_ids: Vec<String> = notifications
            .iter()
            .map(|n| n.sender_id.clone())
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();

        let senders = self.resolve_senders(&sender_ids).await?;

        let resolved = notifications
            .into_iter()
            .filter_map(|notification| {
                let sender = senders.get(&notification.sender_id)?.clone();
                Some(NotificationResponse {
                    id: notification.raw_id(),
                    sender,
                    kind: notification.kind,
                    read: notification.read,
                    created_at: notification.created_at,
                })
            })
            .collect();

        self.db
            .query_with_params(
                "UPDATE notification SET read = true WHERE receiver_id = $receiver",
                json!({ "receiver": receiver_id }),
            )
            .await?;

        Ok(resolved)
    }

    pub async fn delete_all_for(&self, receiver_id: &str) -> Result<()> {
        self.db
            .query_with_params(
                "DELETE notification WHERE receiver_id = $receiver",
                json!({ "receiver": receiver_id }),
            )
            .await?;
        debug!("Deleted all notifications for user {}", receiver_id);
        Ok(())
    }

    /// Delete a single notification, rejecting when it does not belong to
    /// the requester.
    pub async fn delete_one(&self, notification_id: &str, receiver_id: &str) -> Result<()> {
        let notification: Notification = self
            .db
            .get_by_id("notification", notification_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification"))?;

        if notification.receiver_id != receiver_id {
            return Err(AppError::forbidden(
                "You are not authorized to delete this notification",
            ));
        }

        self.db.delete_by_id("notification", notification_id).await
    }

    async fn resolve_senders(&self, sender_ids: &[String]) -> Result<HashMap<String, UserSummary>> {
        if sender_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT * FROM user WHERE meta::id(id) IN $ids",
                json!({ "ids": sender_ids }),
            )
            .await?;
        let users: Vec<User> = response.take(0)?;

        Ok(users
            .into_iter()
            .map(|user| (user.raw_id(), user.to_summary()))
            .collect())
    }
}
