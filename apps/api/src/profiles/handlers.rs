use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::{AppError, AppJson};
use crate::models::profile::ProfileRow;
use crate::profiles::patch::{ProfilePatch, ProfileResponse};
use crate::profiles::photo::{delete_quietly, inspect_upload};
use crate::profiles::repository::{
    apply_changes, delete_user, get_or_create_profile, replace_photo,
};
use crate::state::AppState;

const PHOTO_FIELD: &str = "foto";

/// GET /accounts/me
pub async fn handle_account_me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

/// GET /profile/me
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let profile = get_or_create_profile(&mut tx, &user).await?;
    tx.commit().await?;

    Ok(Json(ProfileResponse::from_row(profile, state.photos.as_ref())))
}

/// PATCH /profile/me
///
/// Validation runs before any database work; the update and the recomputed
/// `is_active` are committed together.
pub async fn handle_patch_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(patch): AppJson<ProfilePatch>,
) -> Result<Json<ProfileResponse>, AppError> {
    let changes = patch.validate()?;

    let mut tx = state.db.begin().await?;
    let profile = get_or_create_profile(&mut tx, &user).await?;
    let updated = apply_changes(&mut tx, profile.id, &changes).await?;
    tx.commit().await?;

    info!(
        "Updated profile {} (active={})",
        updated.id, updated.is_active
    );
    Ok(Json(ProfileResponse::from_row(updated, state.photos.as_ref())))
}

/// DELETE /profile/me
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<StatusCode, AppError> {
    if let Some(key) = delete_user(&state.db, user.id).await? {
        delete_quietly(state.photos.as_ref(), &key).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /profile/me/photo (multipart, field `foto`)
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut payload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some(PHOTO_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
            payload = Some(bytes);
            break;
        }
    }
    let bytes = payload.ok_or_else(|| {
        AppError::BadRequest(format!("Multipart field '{PHOTO_FIELD}' is required"))
    })?;
    let upload = inspect_upload(bytes, state.config.max_photo_bytes)?;

    // No transaction may be open while the blob is uploaded
    let mut tx = state.db.begin().await?;
    let profile = get_or_create_profile(&mut tx, &user).await?;
    tx.commit().await?;

    let key = upload.blob_key(profile.id);
    state
        .photos
        .put(&key, upload.bytes.clone(), upload.content_type)
        .await?;

    let (updated, previous) = match store_photo_key(&state, profile.id, &key).await {
        Ok(result) => result,
        Err(e) => {
            delete_quietly(state.photos.as_ref(), &key).await;
            return Err(e);
        }
    };

    if let Some(old) = previous.filter(|old| *old != key) {
        delete_quietly(state.photos.as_ref(), &old).await;
    }

    info!(
        "Stored photo for profile {} (active={})",
        updated.id, updated.is_active
    );
    Ok(Json(ProfileResponse::from_row(updated, state.photos.as_ref())))
}

async fn store_photo_key(
    state: &AppState,
    profile_id: Uuid,
    key: &str,
) -> Result<(ProfileRow, Option<String>), AppError> {
    let mut tx = state.db.begin().await?;
    let result = replace_photo(&mut tx, profile_id, Some(key)).await?;
    tx.commit().await?;
    Ok(result)
}

/// DELETE /profile/me/photo
pub async fn handle_delete_photo(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let profile = get_or_create_profile(&mut tx, &user).await?;
    let (updated, previous) = replace_photo(&mut tx, profile.id, None).await?;
    tx.commit().await?;

    match previous {
        Some(old) => delete_quietly(state.photos.as_ref(), &old).await,
        None => info!("Profile {} had no photo to remove", updated.id),
    }

    Ok(Json(ProfileResponse::from_row(updated, state.photos.as_ref())))
}
