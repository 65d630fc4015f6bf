use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse},
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use ovation_db::Database;
use ovation_db::models::{SessionRow, UserRow};
use ovation_types::api::{
    LoginRequest, LoginResponse, PasswordStrengthRequest, PasswordStrengthResponse,
    RegisterRequest, RegisterResponse, UserResponse,
};

use crate::error::ApiError;
use crate::forms::Validator;
use crate::password;
use crate::session::{self, CurrentUser};
use crate::stats;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Origin used to build shareable review links (QR payloads).
    pub base_url: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.required("username", &req.username);
    v.length("username", &req.username, 3, 50);
    v.check(
        "username",
        "unique",
        state.db.get_user_by_username(&req.username)?.is_none(),
        "Username already exists. Please choose a different one.",
    );
    v.required("email", &req.email);
    v.email("email", &req.email);
    v.max_length("email", &req.email, 100);
    v.check(
        "email",
        "unique",
        state.db.get_user_by_email(&req.email)?.is_none(),
        "Email already registered. Please use a different email address.",
    );
    v.required("full_name", &req.full_name);
    v.max_length("full_name", &req.full_name, 100);
    if let Some(organization) = &req.organization {
        v.max_length("organization", organization, 100);
    }
    v.required("password", &req.password);
    v.length("password", &req.password, 6, 255);
    v.equals(
        "password_confirmation",
        &req.password,
        &req.password_confirmation,
        "Passwords do not match.",
    );
    v.finish()?;

    let user = UserRow {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        email: req.email,
        password_hash: password::hash_password(&req.password)?,
        full_name: Some(req.full_name),
        organization: req.organization,
        created_at: Utc::now().to_rfc3339(),
        last_login: None,
        is_active: true,
    };
    state.db.create_user(&user)?;

    info!("Registered organizer {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Congratulations, you are now registered! Please log in.".to_string(),
            user: user_response(&user)?,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.required("username", &req.username);
    v.required("password", &req.password);
    v.finish()?;

    // Unknown username and wrong password must be indistinguishable.
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::InvalidCredentials)?;
    if !user.is_active || !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let now = Utc::now();
    state.db.touch_last_login(&user.id, &now.to_rfc3339())?;

    let ttl = session::session_ttl(req.remember);
    let token = session::mint_token();
    state.db.create_session(&SessionRow {
        token: token.clone(),
        user_id: user.id.clone(),
        created_at: now.to_rfc3339(),
        expires_at: (now + ttl).to_rfc3339(),
    })?;

    let display_name = user
        .full_name
        .clone()
        .unwrap_or_else(|| user.username.clone());
    let cookie = session::cookie_value(&token, ttl.num_seconds());

    info!("User {} logged in", user.username);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LoginResponse {
            success: true,
            message: format!("Welcome back, {display_name}!"),
            token,
            user: user_response(&user)?,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_session(&user.token)?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, session::clear_cookie())]),
        Json(serde_json::json!({
            "success": true,
            "message": "You have been logged out.",
        })),
    ))
}

/// Public probe behind the signup form's live strength meter.
pub async fn check_password_strength(
    Json(req): Json<PasswordStrengthRequest>,
) -> Json<PasswordStrengthResponse> {
    let report = password::password_strength(&req.password);
    Json(PasswordStrengthResponse {
        ok: report.ok,
        message: report.message.to_string(),
    })
}

fn user_response(user: &UserRow) -> Result<UserResponse, ApiError> {
    let id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt user id '{}': {}", user.id, e))?;
    Ok(UserResponse {
        id,
        username: user.username.clone(),
        email: user.email.clone(),
        full_name: user.full_name.clone(),
        organization: user.organization.clone(),
        created_at: stats::parse_timestamp(&user.created_at),
    })
}
