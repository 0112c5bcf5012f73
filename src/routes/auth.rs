use crate::{
    error::Result,
    models::user::{LoginRequest, SignupRequest},
    services::auth::CurrentUser,
    state::AppState,
};
use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_me))
}

/// Register a new account and open a session
/// POST /api/auth/signup
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<Response> {
    let user = state.user_service.register(request).await?;

    let token = state.auth_service.sign_token(&user.raw_id())?;
    let cookie = state.auth_service.session_cookie(&token);

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!(user.to_response())),
    )
        .into_response())
}

/// Authenticate and open a session
/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    let user = state.user_service.authenticate(request).await?;

    let token = state.auth_service.sign_token(&user.raw_id())?;
    let cookie = state.auth_service.session_cookie(&token);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!(user.to_response())),
    )
        .into_response())
}

/// Close the session by clearing the cookie
/// POST /api/auth/logout
async fn logout(State(state): State<Arc<AppState>>) -> Result<Response> {
    let cookie = state.auth_service.clear_session_cookie();

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response())
}

/// Current user, password excluded
/// GET /api/auth/me
async fn get_me(CurrentUser(user): CurrentUser) -> Result<Json<Value>> {
    debug!("Getting current user info for user: {}", user.raw_id());

    Ok(Json(json!(user.to_response())))
}
