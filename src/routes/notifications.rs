use crate::{error::Result, services::auth::CurrentUser, state::AppState};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_notifications).delete(delete_notifications))
        .route("/:id", delete(delete_notification))
}

/// List the requester's notifications and mark them all read
/// GET /api/notifications
async fn get_notifications(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    debug!("Listing notifications for user: {}", user.raw_id());

    let notifications = state
        .notification_service
        .list_for(&user.raw_id())
        .await?;

    Ok(Json(json!(notifications)))
}

/// Delete all of the requester's notifications
/// DELETE /api/notifications
async fn delete_notifications(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    state
        .notification_service
        .delete_all_for(&user.raw_id())
        .await?;

    Ok(Json(json!({ "message": "Notifications deleted successfully" })))
}

/// Delete one notification owned by the requester
/// DELETE /api/notifications/:id
async fn delete_notification(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state
        .notification_service
        .delete_one(&id, &user.raw_id())
        .await?;

    Ok(Json(json!({ "message": "Notification deleted successfully" })))
}
