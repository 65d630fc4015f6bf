use axum::{
    Extension,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use qrcode::QrCode;
use qrcode::render::svg;
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::events::{fetch_owned_event, review_url};
use crate::export::sanitize_filename;
use crate::session::CurrentUser;

/// SVG QR of the public review link, served as a download.
pub async fn event_qr_code(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let event = fetch_owned_event(&state, &user, &event_id)?;

    let url = review_url(&state.base_url, &event.unique_code);
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| anyhow::anyhow!("QR encoding failed: {}", e))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .build();

    let disposition = format!(
        "attachment; filename=\"{}_QR.svg\"",
        sanitize_filename(&event.title)
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image,
    )
        .into_response())
}
