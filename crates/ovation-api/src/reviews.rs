use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use ovation_db::models::{EventRow, ReviewRow};
use ovation_types::api::{
    BrowseReviewsResponse, CheckEmailRequest, CheckEmailResponse, PublicEventInfo,
    ReviewFormResponse, ReviewResponse, ReviewSuccessResponse, SubmitReviewRequest,
};
use ovation_types::models::{self, AttendeeType, CATEGORY_LABELS, EventCategory};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::forms::Validator;
use crate::stats;

pub(crate) fn review_response(
    review: &ReviewRow,
    include_email: bool,
) -> Result<ReviewResponse, ApiError> {
    let id: Uuid = review
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt review id '{}': {}", review.id, e))?;

    let categories: Vec<String> = match &review.review_categories {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("Corrupt category list '{}': {}", raw, e))?,
        None => Vec::new(),
    };

    let quality_score = models::quality_score(
        review.star_rating as u8,
        review.review_text.as_deref(),
        categories.len(),
        review.would_recommend,
    );

    Ok(ReviewResponse {
        id,
        reviewer_name: review.reviewer_name.clone(),
        reviewer_email: include_email.then(|| review.reviewer_email.clone()),
        star_rating: review.star_rating as u8,
        review_text: review.review_text.clone(),
        categories,
        attendee_type: review.attendee_type.as_deref().and_then(AttendeeType::parse),
        would_recommend: review.would_recommend,
        submitted_at: stats::parse_timestamp(&review.submitted_at),
        is_approved: review.is_approved,
        is_featured: review.is_featured,
        quality_score,
    })
}

fn public_event(event: &EventRow) -> Result<PublicEventInfo, ApiError> {
    let category = EventCategory::parse(&event.category)
        .ok_or_else(|| anyhow::anyhow!("Unknown event category '{}'", event.category))?;
    let event_date: NaiveDate = event
        .event_date
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt event date '{}': {}", event.event_date, e))?;
    Ok(PublicEventInfo {
        title: event.title.clone(),
        category,
        venue: event.venue.clone(),
        event_date,
        event_time: event.event_time.clone(),
        unique_code: event.unique_code.clone(),
    })
}

fn event_by_code(state: &AppState, code: &str) -> Result<EventRow, ApiError> {
    state
        .db
        .get_event_by_code(code)?
        .ok_or(ApiError::NotFound("Event"))
}

/// Public review-form payload; the disabled page renders off the flag.
pub async fn review_form(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event = event_by_code(&state, &code)?;
    Ok(Json(ReviewFormResponse {
        allow_reviews: event.allow_reviews,
        event: public_event(&event)?,
        category_options: CATEGORY_LABELS.to_vec(),
        attendee_type_options: AttendeeType::ALL.iter().map(|a| a.as_str()).collect(),
    }))
}

pub async fn submit_review(
    State(state): State<AppState>,
    Path(code): Path<String>,
    headers: HeaderMap,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<Response, ApiError> {
    let event = event_by_code(&state, &code)?;

    if !event.allow_reviews {
        // Back to the form; nothing is persisted.
        return Ok(Redirect::to(&format!("/review/{code}")).into_response());
    }

    let mut v = Validator::new();
    v.required("reviewer_name", &req.reviewer_name);
    v.max_length("reviewer_name", &req.reviewer_name, 100);
    v.required("reviewer_email", &req.reviewer_email);
    v.email("reviewer_email", &req.reviewer_email);
    v.max_length("reviewer_email", &req.reviewer_email, 100);
    v.range("star_rating", req.star_rating, 1, 5);
    v.finish()?;

    let success_page = format!("/review/{code}/success");

    // One review per email per event; a repeat submission lands on the
    // success page as if it had worked, and nothing is written.
    if state.db.review_exists(&event.id, &req.reviewer_email)? {
        return Ok(Redirect::to(&success_page).into_response());
    }

    let categories = serde_json::to_string(&req.categories.labels())
        .map_err(|e| anyhow::anyhow!("Category serialization failed: {}", e))?;
    let review = ReviewRow {
        id: Uuid::new_v4().to_string(),
        event_id: event.id.clone(),
        reviewer_name: req.reviewer_name,
        reviewer_email: req.reviewer_email,
        star_rating: req.star_rating,
        review_text: req.review_text.filter(|t| !t.is_empty()),
        review_categories: Some(categories),
        attendee_type: req.attendee_type.map(|a| a.as_str().to_string()),
        would_recommend: req.would_recommend,
        submitted_at: Utc::now().to_rfc3339(),
        ip_address: client_ip(&headers),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        is_approved: true,
        is_featured: false,
        helpful_votes: 0,
    };

    match state.db.insert_review(&review) {
        Ok(()) => {
            info!("Review recorded for event {}", event.unique_code);
        }
        // Lost a duplicate race; same outcome as the pre-check above.
        Err(e) if ovation_db::is_unique_violation(&e) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to(&success_page).into_response())
}

pub async fn review_success(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event = event_by_code(&state, &code)?;
    let recent = state.db.list_approved_reviews(&event.id, Some(3))?;
    Ok(Json(ReviewSuccessResponse {
        event: public_event(&event)?,
        recent_reviews: recent
            .iter()
            .map(|r| review_response(r, false))
            .collect::<Result<Vec<_>, _>>()?,
    }))
}

pub async fn browse_reviews(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event = event_by_code(&state, &code)?;
    let approved = state.db.list_approved_reviews(&event.id, None)?;
    let ratings: Vec<u8> = approved.iter().map(|r| r.star_rating as u8).collect();

    Ok(Json(BrowseReviewsResponse {
        event: public_event(&event)?,
        reviews: approved
            .iter()
            .map(|r| review_response(r, false))
            .collect::<Result<Vec<_>, _>>()?,
        average_rating: stats::average_rating(&ratings),
        rating_distribution: stats::rating_distribution(&ratings),
    }))
}

/// Public duplicate probe used by the form before submission.
pub async fn check_email(
    State(state): State<AppState>,
    Json(req): Json<CheckEmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.required("email", req.email.as_deref().unwrap_or(""));
    v.required("unique_code", req.unique_code.as_deref().unwrap_or(""));
    v.finish()?;
    let (email, code) = (req.email.unwrap_or_default(), req.unique_code.unwrap_or_default());

    let event = event_by_code(&state, &code)?;
    let exists = state.db.review_exists(&event.id, &email)?;

    Ok(Json(CheckEmailResponse {
        exists,
        message: if exists {
            "You have already reviewed this event".to_string()
        } else {
            "Email available".to_string()
        },
    }))
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}
