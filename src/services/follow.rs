use crate::{
    error::{AppError, Result},
    models::notification::{NewNotification, NotificationKind},
    models::user::User,
    services::{Database, NotificationService},
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction {
    Followed,
    Unfollowed,
}

/// Social graph mutator. Toggles follow edges between two user records.
#[derive(Clone)]
pub struct FollowService {
    db: Arc<Database>,
    notification_service: NotificationService,
}

impl FollowService {
    pub async fn new(db: Arc<Database>, notification_service: NotificationService) -> Result<Self> {
        Ok(Self {
            db,
            notification_service,
        })
    }

    /// Toggle the follow edge from `actor_id` to `target_id`.
    ///
    /// Both record updates run in a single transaction so a crash cannot
    /// leave a one-directional edge. Following records a notification;
    /// unfollowing does not.
    pub async fn toggle_follow(&self, actor_id: &str, target_id: &str) -> Result<FollowAction> {
        debug!("User {} toggling follow on user {}", actor_id, target_id);

        if actor_id == target_id {
            return Err(AppError::bad_request("Cannot follow/unfollow yourself"));
        }

        let target: Option<User> = self.db.get_by_id("user", target_id).await?;
        if target.is_none() {
            return Err(AppError::not_found("User"));
        }
        let actor: User = self
            .db
            .get_by_id("user", actor_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let now = Utc::now();

        if actor.following.contains(&target_id.to_string()) {
            self.db
                .query_with_params(
                    r#"
                        BEGIN TRANSACTION;
                        UPDATE type::thing('user', $target) SET followers -= $actor, updated_at = $now;
                        UPDATE type::thing('user', $actor) SET following -= $target, updated_at = $now;
                        COMMIT TRANSACTION;
                    "#,
                    json!({ "actor": actor_id, "target": target_id, "now": now }),
                )
                .await?;

            info!("User {} unfollowed user {}", actor_id, target_id);
            Ok(FollowAction::Unfollowed)
        } else {
            self.db
                .query_with_params(
                    r#"
                        BEGIN TRANSACTION;
                        UPDATE type::thing('user', $target)
                            SET followers = array::union(followers, [$actor]), updated_at = $now;
                        UPDATE type::thing('user', $actor)
                            SET following = array::union(following, [$target]), updated_at = $now;
                        COMMIT TRANSACTION;
                    "#,
                    json!({ "actor": actor_id, "target": target_id, "now": now }),
                )
                .await?;

            let notification = NewNotification::new(
                actor_id.to_string(),
                target_id.to_string(),
                NotificationKind::Follow,
            );
            if let Err(e) = self.notification_service.record(notification).await {
                tracing::warn!("Failed to record follow notification: {}", e);
            }

            info!("User {} followed user {}", actor_id, target_id);
            Ok(FollowAction::Followed)
        }
    }
}
