//! Database row types; these map directly to SQLite rows.
//! Distinct from the ovation-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub organization: Option<String>,
    pub created_at: String,
    pub last_login: Option<String>,
    pub is_active: bool,
}

pub struct SessionRow {
    pub token: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: String,
}

pub struct EventRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub venue: String,
    pub event_date: String,
    pub event_time: Option<String>,
    pub capacity: Option<i64>,
    pub status: String,
    pub unique_code: String,
    pub allow_reviews: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ReviewRow {
    pub id: String,
    pub event_id: String,
    pub reviewer_name: String,
    pub reviewer_email: String,
    pub star_rating: i64,
    pub review_text: Option<String>,
    pub review_categories: Option<String>,
    pub attendee_type: Option<String>,
    pub would_recommend: bool,
    pub submitted_at: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_approved: bool,
    pub is_featured: bool,
    pub helpful_votes: i64,
}
