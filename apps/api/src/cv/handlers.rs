use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use crate::auth::CurrentUser;
use crate::cv::{render_cv, CvTemplate};
use crate::directory::query::find_by_profile_id;
use crate::directory::view::load_public_profile;
use crate::errors::AppError;
use crate::profiles::repository::get_or_create_profile;
use crate::state::AppState;

const CV_FILENAME: &str = "CV.pdf";

/// GET /profile/me/cv
///
/// Renders the caller's own profile whether or not it is active.
pub async fn handle_download_cv(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let mut tx = state.db.begin().await?;
    let profile = get_or_create_profile(&mut tx, &user).await?;
    tx.commit().await?;

    let row = find_by_profile_id(&state.db, profile.id).await?;
    let view = load_public_profile(&state.db, row, state.photos.as_ref()).await?;

    let photo = match view.photo_key.as_deref() {
        Some(key) => match state.photos.get(key).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("Rendering CV for profile {} without photo: {e}", profile.id);
                None
            }
        },
        None => None,
    };

    let template = CvTemplate {
        institution: state.config.cv_institution.clone(),
    };
    let pdf = tokio::task::spawn_blocking(move || render_cv(&view, photo.as_deref(), &template))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in CV render: {e}")))?
        .map_err(|e| AppError::Internal(e.into()))?;

    info!("Rendered CV for profile {} ({} bytes)", profile.id, pdf.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CV_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
