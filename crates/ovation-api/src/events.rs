use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use ovation_db::models::EventRow;
use ovation_types::api::{
    DashboardResponse, EventCreateRequest, EventDetailResponse, EventMutationResponse,
    EventResponse, EventSummary, EventUpdateRequest, RecentReview,
};
use ovation_types::models::{EventCategory, EventStatus};

use crate::auth::AppState;
use crate::codes;
use crate::error::ApiError;
use crate::forms::Validator;
use crate::reviews::review_response;
use crate::session::CurrentUser;
use crate::stats;

/// The one ownership check behind every event-scoped operation: resolve the
/// event, compare its owner against the session identity, 403 on mismatch.
pub(crate) fn fetch_owned_event(
    state: &AppState,
    user: &CurrentUser,
    event_id: &Uuid,
) -> Result<EventRow, ApiError> {
    let event = state
        .db
        .get_event(&event_id.to_string())?
        .ok_or(ApiError::NotFound("Event"))?;
    if event.user_id != user.id.to_string() {
        return Err(ApiError::Forbidden);
    }
    Ok(event)
}

pub(crate) fn event_response(base_url: &str, event: &EventRow) -> Result<EventResponse, ApiError> {
    let id: Uuid = event
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt event id '{}': {}", event.id, e))?;
    let category = EventCategory::parse(&event.category)
        .ok_or_else(|| anyhow::anyhow!("Unknown event category '{}'", event.category))?;
    let status = EventStatus::parse(&event.status)
        .ok_or_else(|| anyhow::anyhow!("Unknown event status '{}'", event.status))?;
    let event_date: NaiveDate = event
        .event_date
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt event date '{}': {}", event.event_date, e))?;

    Ok(EventResponse {
        id,
        title: event.title.clone(),
        category,
        description: event.description.clone(),
        venue: event.venue.clone(),
        event_date,
        event_time: event.event_time.clone(),
        capacity: event.capacity,
        status,
        unique_code: event.unique_code.clone(),
        allow_reviews: event.allow_reviews,
        review_url: review_url(base_url, &event.unique_code),
        created_at: stats::parse_timestamp(&event.created_at),
        updated_at: stats::parse_timestamp(&event.updated_at),
    })
}

pub(crate) fn review_url(base_url: &str, unique_code: &str) -> String {
    format!("{}/review/{}", base_url.trim_end_matches('/'), unique_code)
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EventCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.required("title", &req.title);
    v.max_length("title", &req.title, 200);
    v.required("venue", &req.venue);
    v.max_length("venue", &req.venue, 200);
    v.min_value("capacity", req.capacity, 1);
    // Creation only; edits may legitimately describe past events.
    v.not_in_past("event_date", req.event_date, Utc::now().date_naive());
    v.finish()?;

    let unique_code = codes::generate_unique_code(|code| state.db.event_code_exists(code))?;
    let now = Utc::now().to_rfc3339();
    let event = EventRow {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.to_string(),
        title: req.title,
        category: req.category.as_str().to_string(),
        description: req.description,
        venue: req.venue,
        event_date: req.event_date.to_string(),
        event_time: req.event_time.map(|t| t.format("%H:%M:%S").to_string()),
        capacity: req.capacity,
        status: EventStatus::Upcoming.as_str().to_string(),
        unique_code,
        allow_reviews: true,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.create_event(&event)?;

    info!("Event '{}' created with code {}", event.title, event.unique_code);

    Ok((
        StatusCode::CREATED,
        Json(EventMutationResponse {
            success: true,
            message: format!("Event \"{}\" created successfully!", event.title),
            event: event_response(&state.base_url, &event)?,
        }),
    ))
}

pub async fn edit_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<EventUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut event = fetch_owned_event(&state, &user, &event_id)?;

    let mut v = Validator::new();
    v.required("title", &req.title);
    v.max_length("title", &req.title, 200);
    v.required("venue", &req.venue);
    v.max_length("venue", &req.venue, 200);
    v.min_value("capacity", req.capacity, 1);
    v.finish()?;

    event.title = req.title;
    event.category = req.category.as_str().to_string();
    event.description = req.description;
    event.venue = req.venue;
    event.event_date = req.event_date.to_string();
    event.event_time = req.event_time.map(|t| t.format("%H:%M:%S").to_string());
    event.capacity = req.capacity;
    event.status = req.status.as_str().to_string();
    event.allow_reviews = req.allow_reviews;
    event.updated_at = Utc::now().to_rfc3339();
    state.db.update_event(&event)?;

    Ok(Json(EventMutationResponse {
        success: true,
        message: "Event updated successfully!".to_string(),
        event: event_response(&state.base_url, &event)?,
    }))
}

pub async fn event_details(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = fetch_owned_event(&state, &user, &event_id)?;
    let all_reviews = state.db.list_reviews_for_event(&event.id)?;

    let approved: Vec<_> = all_reviews.iter().filter(|r| r.is_approved).collect();
    let ratings: Vec<u8> = approved.iter().map(|r| r.star_rating as u8).collect();

    let reviews = approved
        .iter()
        .map(|r| review_response(r, true))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(EventDetailResponse {
        event: event_response(&state.base_url, &event)?,
        reviews,
        average_rating: stats::average_rating(&ratings),
        rating_distribution: stats::rating_distribution(&ratings),
        response_rate: stats::response_rate(all_reviews.len(), event.capacity),
    }))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let events = state.db.list_events_for_user(&user.id.to_string())?;
    let owned_reviews = state.db.list_reviews_for_owner(&user.id.to_string())?;

    // Bucket approved ratings per event for the summary cards.
    let mut per_event: HashMap<&str, Vec<u8>> = HashMap::new();
    let mut all_approved_ratings: Vec<u8> = Vec::new();
    for (review, _) in &owned_reviews {
        if review.is_approved {
            let rating = review.star_rating as u8;
            per_event.entry(review.event_id.as_str()).or_default().push(rating);
            all_approved_ratings.push(rating);
        }
    }
    let mut review_counts: HashMap<&str, usize> = HashMap::new();
    for (review, _) in &owned_reviews {
        *review_counts.entry(review.event_id.as_str()).or_default() += 1;
    }

    let summaries = events
        .iter()
        .map(|event| {
            let ratings: &[u8] = per_event.get(event.id.as_str()).map_or(&[], |v| v.as_slice());
            let response = event_response(&state.base_url, event)?;
            Ok(EventSummary {
                id: response.id,
                title: response.title,
                category: response.category,
                event_date: response.event_date,
                status: response.status,
                unique_code: response.unique_code,
                review_count: review_counts.get(event.id.as_str()).copied().unwrap_or(0),
                average_rating: stats::average_rating(ratings),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let now = Utc::now();
    let recent_reviews = owned_reviews
        .iter()
        .filter(|(review, _)| review.is_approved)
        .take(5)
        .map(|(review, event_title)| {
            let submitted_at = stats::parse_timestamp(&review.submitted_at);
            RecentReview {
                event_title: event_title.clone(),
                reviewer_name: review.reviewer_name.clone(),
                star_rating: review.star_rating as u8,
                submitted_at,
                submitted_ago: stats::format_relative(submitted_at, now),
            }
        })
        .collect();

    Ok(Json(DashboardResponse {
        total_events: events.len(),
        total_reviews: owned_reviews.len(),
        average_rating: stats::average_rating(&all_approved_ratings),
        events: summaries,
        recent_reviews,
    }))
}
