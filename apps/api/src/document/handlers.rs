use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Local;
use uuid::Uuid;

use crate::document::generator::generate_cv;
use crate::errors::AppError;
use crate::models::section::SectionSelection;
use crate::state::AppState;

/// GET /api/v1/profiles/:id/cv.pdf
///
/// Query flags (`experience`, `awards`, ...) override the stored section
/// toggles for this document only.
pub async fn handle_download_cv(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Query(selection): Query<SectionSelection>,
) -> Result<Response, AppError> {
    let today = Local::now().date_naive();
    let cv = generate_cv(
        state.repo.as_ref(),
        profile_id,
        selection,
        &state.page_config,
        today,
    )
    .await?;

    let disposition = format!("inline; filename=\"{}\"", cv.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(cv.bytes),
    )
        .into_response())
}
