use crate::{
    error::Result,
    models::user::UpdateUserRequest,
    services::auth::CurrentUser,
    services::follow::FollowAction,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile/:username", get(get_user_profile))
        .route("/follow/:id", post(follow_unfollow_user))
        .route("/suggested", get(get_suggested_users))
        .route("/update", post(update_user))
}

/// Public profile lookup by username
/// GET /api/users/profile/:username
async fn get_user_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    debug!("Getting profile for username: {}", username);

    let user = state.user_service.get_profile(&username).await?;

    Ok(Json(json!(user.to_response())))
}

/// Toggle a follow edge on the target user
/// POST /api/users/follow/:id
async fn follow_unfollow_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let action = state
        .follow_service
        .toggle_follow(&user.raw_id(), &id)
        .await?;

    let message = match action {
        FollowAction::Followed => "User followed successfully",
        FollowAction::Unfollowed => "User unfollowed successfully",
    };

    Ok(Json(json!({ "message": message })))
}

/// Up to four users the requester does not follow yet
/// GET /api/users/suggested
async fn get_suggested_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    let suggested = state.user_service.suggested_users(&user.raw_id()).await?;

    let responses: Vec<_> = suggested.iter().map(|u| u.to_response()).collect();
    Ok(Json(json!(responses)))
}

/// Partial profile update for the authenticated user
/// POST /api/users/update
async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<Value>> {
    debug!("Updating profile for user: {}", user.raw_id());

    let updated = state
        .user_service
        .update_user(&user.raw_id(), request)
        .await?;

    Ok(Json(json!(updated.to_response())))
}
