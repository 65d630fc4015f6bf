use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;
use uuid::Uuid;

use ovation_db::models::ReviewRow;
use ovation_types::api::ActionResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::session::CurrentUser;

/// Moderation shares one gate: resolve review + owning user in a single
/// joined lookup, then compare against the session identity.
fn fetch_owned_review(
    state: &AppState,
    user: &CurrentUser,
    review_id: &Uuid,
) -> Result<ReviewRow, ApiError> {
    let (review, owner_id) = state
        .db
        .get_review_with_owner(&review_id.to_string())?
        .ok_or(ApiError::NotFound("Review"))?;
    if owner_id != user.id.to_string() {
        return Err(ApiError::Forbidden);
    }
    Ok(review)
}

/// Idempotent: approving an approved review is a no-op success.
pub async fn approve_review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let review = fetch_owned_review(&state, &user, &review_id)?;
    state.db.set_review_approved(&review.id, true)?;
    Ok(Json(ActionResponse {
        success: true,
        message: "Review approved".to_string(),
        is_featured: None,
    }))
}

pub async fn reject_review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let review = fetch_owned_review(&state, &user, &review_id)?;
    state.db.set_review_approved(&review.id, false)?;
    Ok(Json(ActionResponse {
        success: true,
        message: "Review rejected".to_string(),
        is_featured: None,
    }))
}

pub async fn feature_review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let review = fetch_owned_review(&state, &user, &review_id)?;
    let featured = !review.is_featured;
    state.db.set_review_featured(&review.id, featured)?;
    Ok(Json(ActionResponse {
        success: true,
        message: if featured {
            "Review featured".to_string()
        } else {
            "Review unfeatured".to_string()
        },
        is_featured: Some(featured),
    }))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let review = fetch_owned_review(&state, &user, &review_id)?;
    state.db.delete_review(&review.id)?;
    info!("Review {} deleted by {}", review.id, user.username);
    Ok(Json(ActionResponse {
        success: true,
        message: "Review deleted".to_string(),
        is_featured: None,
    }))
}
