use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use ovation_types::api::AnalyticsResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::events::fetch_owned_event;
use crate::session::CurrentUser;
use crate::stats;

pub async fn event_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = fetch_owned_event(&state, &user, &event_id)?;
    let all_reviews = state.db.list_reviews_for_event(&event.id)?;
    let approved: Vec<_> = all_reviews.iter().filter(|r| r.is_approved).collect();

    let ratings: Vec<u8> = approved.iter().map(|r| r.star_rating as u8).collect();
    let activity: Vec<_> = approved
        .iter()
        .map(|r| {
            (
                stats::parse_timestamp(&r.submitted_at),
                r.star_rating as u8,
                r.reviewer_name.clone(),
            )
        })
        .collect();

    Ok(Json(AnalyticsResponse {
        total_reviews: approved.len(),
        average_rating: stats::average_rating(&ratings),
        rating_distribution: stats::rating_distribution(&ratings),
        // Intentionally counts unapproved submissions too.
        response_rate: stats::response_rate(all_reviews.len(), event.capacity),
        recent_activity: stats::recent_activity(&activity, Utc::now()),
        top_words: stats::word_frequency(
            approved.iter().filter_map(|r| r.review_text.as_deref()),
        ),
    }))
}
