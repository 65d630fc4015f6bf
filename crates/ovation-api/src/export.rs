use axum::{
    Extension,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use ovation_types::models::quality_score;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::events::fetch_owned_event;
use crate::session::CurrentUser;
use crate::stats;

const CSV_HEADER: [&str; 12] = [
    "Review ID",
    "Reviewer Name",
    "Reviewer Email",
    "Star Rating",
    "Review Text",
    "Categories",
    "Attendee Type",
    "Would Recommend",
    "Submitted At",
    "Is Approved",
    "Is Featured",
    "Quality Score",
];

/// CSV download of every review for the event, approved or not.
pub async fn export_event_reviews(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let event = fetch_owned_event(&state, &user, &event_id)?;

    // Run the bulk read off the async runtime
    let db = state.clone();
    let export_event_id = event.id.clone();
    let reviews = tokio::task::spawn_blocking(move || {
        db.db.list_reviews_for_event(&export_event_id)
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| anyhow::anyhow!("CSV write failed: {}", e))?;

    for review in &reviews {
        let categories: Vec<String> = match &review.review_categories {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Corrupt category list '{}': {}", raw, e))?,
            None => Vec::new(),
        };
        let score = quality_score(
            review.star_rating as u8,
            review.review_text.as_deref(),
            categories.len(),
            review.would_recommend,
        );
        let submitted = stats::parse_timestamp(&review.submitted_at)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let rating = review.star_rating.to_string();
        let category_list = categories.join(", ");
        let score = score.to_string();

        writer
            .write_record([
                review.id.as_str(),
                review.reviewer_name.as_str(),
                review.reviewer_email.as_str(),
                rating.as_str(),
                review.review_text.as_deref().unwrap_or(""),
                category_list.as_str(),
                review.attendee_type.as_deref().unwrap_or(""),
                if review.would_recommend { "Yes" } else { "No" },
                submitted.as_str(),
                if review.is_approved { "Yes" } else { "No" },
                if review.is_featured { "Yes" } else { "No" },
                score.as_str(),
            ])
            .map_err(|e| anyhow::anyhow!("CSV write failed: {}", e))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e))?;

    let disposition = format!(
        "attachment; filename=\"{}_reviews.csv\"",
        sanitize_filename(&event.title)
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_drop_header_unsafe_characters() {
        assert_eq!(sanitize_filename("Jazz Night"), "Jazz Night");
        assert_eq!(sanitize_filename("A/B \"2026\""), "A_B _2026_");
    }
}
