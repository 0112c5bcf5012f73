use crate::{
    error::Result,
    models::post::{CommentRequest, CreatePostRequest},
    services::auth::CurrentUser,
    services::post::LikeAction,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_post))
        .route("/all", get(get_all_posts))
        .route("/likes/:id", get(get_liked_posts))
        .route("/following", get(get_following_posts))
        .route("/user/:username", get(get_user_posts))
        .route("/comment/:id", post(comment_on_post))
        .route("/like/:id", post(like_unlike_post))
        .route("/:id", delete(delete_post))
}

/// Create a post with text and/or an image
/// POST /api/posts/create
async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<Value>> {
    let post = state
        .post_service
        .create_post(&user.raw_id(), request)
        .await?;

    Ok(Json(json!(post)))
}

/// Delete an owned post
/// DELETE /api/posts/:id
async fn delete_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state.post_service.delete_post(&id, &user.raw_id()).await?;

    Ok(Json(json!({ "message": "Post deleted successfully" })))
}

/// Append a comment to a post
/// POST /api/posts/comment/:id
async fn comment_on_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<Value>> {
    let post = state
        .post_service
        .comment_on_post(&id, &user.raw_id(), request)
        .await?;

    Ok(Json(json!(post)))
}

/// Toggle a like on a post
/// POST /api/posts/like/:id
async fn like_unlike_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let action = state.post_service.toggle_like(&id, &user.raw_id()).await?;

    let message = match action {
        LikeAction::Liked => "Post liked successfully",
        LikeAction::Unliked => "Post unliked successfully",
    };

    Ok(Json(json!({ "message": message })))
}

/// All posts, newest first
/// GET /api/posts/all
async fn get_all_posts(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let posts = state.post_service.get_all_posts().await?;

    Ok(Json(json!(posts)))
}

/// Posts liked by the given user
/// GET /api/posts/likes/:id
async fn get_liked_posts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Getting liked posts for user: {}", id);

    let posts = state.post_service.get_liked_posts(&id).await?;

    Ok(Json(json!(posts)))
}

/// Posts authored by users the requester follows
/// GET /api/posts/following
async fn get_following_posts(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    let posts = state
        .post_service
        .get_following_posts(&user.raw_id())
        .await?;

    Ok(Json(json!(posts)))
}

/// Posts authored by the named user
/// GET /api/posts/user/:username
async fn get_user_posts(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    debug!("Getting posts for username: {}", username);

    let posts = state.post_service.get_user_posts(&username).await?;

    Ok(Json(json!(posts)))
}
