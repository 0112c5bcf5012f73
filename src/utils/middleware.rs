use crate::{error::AppError, services::auth::SESSION_COOKIE, state::AppState};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Session middleware.
///
/// Reads the session cookie, verifies the token and, when it resolves to an
/// existing user, places the user record into request extensions for the
/// `CurrentUser` extractor. A missing or invalid token (or a token whose
/// user no longer exists) lets the request continue unauthenticated;
/// protected handlers reject it at extraction time.
pub async fn auth_middleware(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next<Body>,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        match app_state.auth_service.verify_token(&token) {
            Ok(claims) => match app_state.user_service.find_by_id(&claims.sub).await {
                Ok(Some(user)) => {
                    debug!("Authenticated user: {} ({})", user.username, user.raw_id());
                    request.extensions_mut().insert(user);
                }
                Ok(None) => {
                    debug!("Session token references missing user: {}", claims.sub);
                }
                Err(e) => {
                    warn!("Failed to load session user {}: {}", claims.sub, e);
                }
            },
            Err(e) => {
                debug!("Session token rejected: {}", e);
            }
        }
    }

    Ok(next.run(request).await)
}

/// Extract the session token from the Cookie header, if present.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn session_token_is_extracted_from_cookie_header() {
        let headers = headers_with_cookie("jwt=abc.def.ghi");
        assert_eq!(session_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn session_token_is_found_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; jwt=abc.def.ghi; lang=en");
        assert_eq!(session_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn missing_cookie_yields_no_token() {
        assert_eq!(session_token(&HeaderMap::new()), None);

        let headers = headers_with_cookie("theme=dark");
        assert_eq!(session_token(&headers), None);
    }
}
