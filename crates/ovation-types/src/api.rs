use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AttendeeType, EventCategory, EventStatus, ReviewCategories};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub organization: Option<String>,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub organization: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordStrengthRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct PasswordStrengthResponse {
    pub ok: bool,
    pub message: String,
}

// -- Events --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventCreateRequest {
    pub title: String,
    pub category: EventCategory,
    #[serde(default)]
    pub description: Option<String>,
    pub venue: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub event_time: Option<NaiveTime>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

/// Bulk edit: every editable field is applied, including status and the
/// review toggle. Edits may move past events to completed, so there is no
/// date check here.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventUpdateRequest {
    pub title: String,
    pub category: EventCategory,
    #[serde(default)]
    pub description: Option<String>,
    pub venue: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub event_time: Option<NaiveTime>,
    #[serde(default)]
    pub capacity: Option<i64>,
    pub status: EventStatus,
    pub allow_reviews: bool,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub category: EventCategory,
    pub description: Option<String>,
    pub venue: String,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub capacity: Option<i64>,
    pub status: EventStatus,
    pub unique_code: String,
    pub allow_reviews: bool,
    pub review_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EventMutationResponse {
    pub success: bool,
    pub message: String,
    pub event: EventResponse,
}

#[derive(Debug, Serialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub title: String,
    pub category: EventCategory,
    pub event_date: NaiveDate,
    pub status: EventStatus,
    pub unique_code: String,
    pub review_count: usize,
    pub average_rating: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_events: usize,
    pub total_reviews: usize,
    pub average_rating: f64,
    pub events: Vec<EventSummary>,
    pub recent_reviews: Vec<RecentReview>,
}

#[derive(Debug, Serialize)]
pub struct RecentReview {
    pub event_title: String,
    pub reviewer_name: String,
    pub star_rating: u8,
    pub submitted_at: DateTime<Utc>,
    pub submitted_ago: String,
}

#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    pub event: EventResponse,
    pub reviews: Vec<ReviewResponse>,
    pub average_rating: f64,
    pub rating_distribution: BTreeMap<u8, u32>,
    pub response_rate: f64,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub reviewer_name: String,
    pub reviewer_email: String,
    pub star_rating: i64,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default)]
    pub attendee_type: Option<AttendeeType>,
    #[serde(default)]
    pub would_recommend: bool,
    #[serde(flatten)]
    pub categories: ReviewCategories,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub reviewer_name: String,
    /// Owner-facing views only; omitted on public pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_email: Option<String>,
    pub star_rating: u8,
    pub review_text: Option<String>,
    pub categories: Vec<String>,
    pub attendee_type: Option<AttendeeType>,
    pub would_recommend: bool,
    pub submitted_at: DateTime<Utc>,
    pub is_approved: bool,
    pub is_featured: bool,
    pub quality_score: u8,
}

#[derive(Debug, Serialize)]
pub struct PublicEventInfo {
    pub title: String,
    pub category: EventCategory,
    pub venue: String,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub unique_code: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewFormResponse {
    pub event: PublicEventInfo,
    pub allow_reviews: bool,
    pub category_options: Vec<&'static str>,
    pub attendee_type_options: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ReviewSuccessResponse {
    pub event: PublicEventInfo,
    pub recent_reviews: Vec<ReviewResponse>,
}

#[derive(Debug, Serialize)]
pub struct BrowseReviewsResponse {
    pub event: PublicEventInfo,
    pub reviews: Vec<ReviewResponse>,
    pub average_rating: f64,
    pub rating_distribution: BTreeMap<u8, u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub unique_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
    pub message: String,
}

// -- Moderation & analytics --

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub total_reviews: usize,
    pub average_rating: f64,
    pub rating_distribution: BTreeMap<u8, u32>,
    pub response_rate: f64,
    pub recent_activity: Vec<ActivityEntry>,
    pub top_words: Vec<WordCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub date: String,
    pub rating: u8,
    pub reviewer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u32,
}
