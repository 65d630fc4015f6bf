use axum::{
    Json, Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::AppState;
use crate::{analytics, auth, events, export, moderation, qr, reviews, session};

/// Full application router. Everything above the session layer is public:
/// auth entry points and the code-keyed review surface.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(home))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/password-strength", post(auth::check_password_strength))
        .route("/review/{code}", get(reviews::review_form))
        .route("/review/{code}/submit", post(reviews::submit_review))
        .route("/review/{code}/success", get(reviews::review_success))
        .route("/review/{code}/browse", get(reviews::browse_reviews))
        .route("/api/check-email", post(reviews::check_email));

    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard", get(events::dashboard))
        .route("/events", post(events::create_event))
        .route(
            "/event/{event_id}",
            get(events::event_details).put(events::edit_event),
        )
        .route("/event/{event_id}/qr", get(qr::event_qr_code))
        .route("/event/{event_id}/export", get(export::export_event_reviews))
        .route("/api/event/{event_id}/analytics", get(analytics::event_analytics))
        .route("/api/review/{review_id}/approve", post(moderation::approve_review))
        .route("/api/review/{review_id}/reject", post(moderation::reject_review))
        .route("/api/review/{review_id}/feature", post(moderation::feature_review))
        .route("/api/review/{review_id}/delete", delete(moderation::delete_review))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new().merge(public).merge(protected).with_state(state)
}

async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "ovation",
        "title": "Event Review Platform",
    }))
}
