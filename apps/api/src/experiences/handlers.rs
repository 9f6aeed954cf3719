use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::{ensure_owner, CurrentUser};
use crate::errors::{AppError, AppJson};
use crate::experiences::input::ExperienceInput;
use crate::experiences::repository::{
    delete_experience, experience_owner, find_experience, insert_experience, list_experiences,
    update_experience,
};
use crate::models::experience::ExperienceRow;
use crate::profiles::completeness::recompute_active;
use crate::profiles::repository::get_or_create_profile;
use crate::state::AppState;

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Experience {id} not found"))
}

/// GET /experiences
pub async fn handle_list_experiences(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ExperienceRow>>, AppError> {
    Ok(Json(list_experiences(&state.db, user.id).await?))
}

/// POST /experiences
pub async fn handle_create_experience(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(input): AppJson<ExperienceInput>,
) -> Result<(StatusCode, Json<ExperienceRow>), AppError> {
    let experience = input.into_new()?;

    let mut tx = state.db.begin().await?;
    let profile = get_or_create_profile(&mut tx, &user).await?;
    let created = insert_experience(&mut tx, profile.id, &experience).await?;
    let active = recompute_active(&mut tx, profile.id).await?;
    tx.commit().await?;

    info!(
        "Added experience {} to profile {} (active={active})",
        created.id, profile.id
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /experiences/{id}
pub async fn handle_get_experience(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExperienceRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    match experience_owner(&mut conn, id).await? {
        Some(owner) if owner == user.id => Ok(Json(find_experience(&mut conn, id).await?)),
        _ => Err(not_found(id)),
    }
}

/// PUT|PATCH /experiences/{id}
pub async fn handle_update_experience(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<ExperienceInput>,
) -> Result<Json<ExperienceRow>, AppError> {
    let changes = input.into_changes()?;

    let mut tx = state.db.begin().await?;
    let owner = experience_owner(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_owner(owner, &user)?;
    let updated = update_experience(&mut tx, id, &changes).await?;
    tx.commit().await?;

    Ok(Json(updated))
}

/// DELETE /experiences/{id}
pub async fn handle_delete_experience(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;
    let owner = experience_owner(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_owner(owner, &user)?;
    let profile_id = delete_experience(&mut tx, id).await?;
    let active = recompute_active(&mut tx, profile_id).await?;
    tx.commit().await?;

    info!("Deleted experience {id} from profile {profile_id} (active={active})");
    Ok(StatusCode::NO_CONTENT)
}
