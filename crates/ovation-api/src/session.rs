use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "ovation_session";

/// Identity resolved from a session token; inserted as a request extension
/// by `require_session` so handlers never reach for ambient state.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub token: String,
}

/// 32 random bytes, base64url. Opaque; identity lives in the sessions table.
pub fn mint_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn session_ttl(remember: bool) -> Duration {
    if remember {
        Duration::days(30)
    } else {
        Duration::days(1)
    }
}

pub fn cookie_value(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn token_from_request(req: &Request) -> Option<String> {
    if let Some(auth) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = req.headers().get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|c| c.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .map(|t| t.to_string())
}

/// Session guard for every protected route: token -> sessions row -> user,
/// expired rows deleted on sight.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_request(&req).ok_or(ApiError::AuthRequired)?;

    let session = state
        .db
        .get_session(&token)?
        .ok_or(ApiError::AuthRequired)?;

    let expires_at = session
        .expires_at
        .parse::<DateTime<Utc>>()
        .map_err(|e| anyhow::anyhow!("Corrupt session expiry '{}': {}", session.expires_at, e))?;
    if expires_at <= Utc::now() {
        state.db.delete_session(&token)?;
        return Err(ApiError::AuthRequired);
    }

    let user = state
        .db
        .get_user_by_id(&session.user_id)?
        .ok_or(ApiError::AuthRequired)?;
    if !user.is_active {
        return Err(ApiError::AuthRequired);
    }

    let id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt user id '{}': {}", user.id, e))?;

    req.extensions_mut().insert(CurrentUser {
        id,
        username: user.username,
        full_name: user.full_name,
        token,
    });
    Ok(next.run(req).await)
}
