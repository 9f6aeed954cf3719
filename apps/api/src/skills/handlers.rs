use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{ensure_owner, CurrentUser};
use crate::errors::{AppError, AppJson};
use crate::models::skill::{SkillLevel, SkillRow};
use crate::profiles::completeness::recompute_active;
use crate::profiles::repository::get_or_create_profile;
use crate::profiles::validation::{FieldError, FieldErrors};
use crate::skills::input::SkillInput;
use crate::skills::repository::{
    delete_skill, find_skill, insert_skill, list_skills, skill_owner, update_skill,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SkillQuery {
    pub level: Option<String>,
    pub search: Option<String>,
}

impl SkillQuery {
    fn level(&self) -> Result<Option<SkillLevel>, FieldErrors> {
        match self.level.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| FieldErrors::single("level", FieldError::Other(e))),
        }
    }

    fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// GET /skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<SkillQuery>,
) -> Result<Json<Vec<SkillRow>>, AppError> {
    let level = query.level()?;
    let skills = list_skills(&state.db, user.id, level, query.search()).await?;
    Ok(Json(skills))
}

/// POST /skills
pub async fn handle_create_skill(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(input): AppJson<SkillInput>,
) -> Result<(StatusCode, Json<SkillRow>), AppError> {
    let skill = input.into_new()?;

    let mut tx = state.db.begin().await?;
    let profile = get_or_create_profile(&mut tx, &user).await?;
    let created = insert_skill(&mut tx, profile.id, &skill).await?;
    let active = recompute_active(&mut tx, profile.id).await?;
    tx.commit().await?;

    info!(
        "Added skill '{}' to profile {} (active={active})",
        created.name, profile.id
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /skills/{id}
///
/// Another user's skill is reported as missing.
pub async fn handle_get_skill(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    match skill_owner(&mut conn, id).await? {
        Some(owner) if owner == user.id => Ok(Json(find_skill(&mut conn, id).await?)),
        _ => Err(AppError::NotFound(format!("Skill {id} not found"))),
    }
}

/// PUT|PATCH /skills/{id}
pub async fn handle_update_skill(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<SkillInput>,
) -> Result<Json<SkillRow>, AppError> {
    let changes = input.into_changes()?;

    let mut tx = state.db.begin().await?;
    let owner = skill_owner(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Skill {id} not found")))?;
    ensure_owner(owner, &user)?;
    let updated = update_skill(&mut tx, id, &changes).await?;
    tx.commit().await?;

    Ok(Json(updated))
}

/// DELETE /skills/{id}
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;
    let owner = skill_owner(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Skill {id} not found")))?;
    ensure_owner(owner, &user)?;
    let profile_id = delete_skill(&mut tx, id).await?;
    let active = recompute_active(&mut tx, profile_id).await?;
    tx.commit().await?;

    info!("Deleted skill {id} from profile {profile_id} (active={active})");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_level_means_any() {
        let query = SkillQuery {
            level: Some(" ".to_string()),
            search: Some("".to_string()),
        };
        assert_eq!(query.level().unwrap(), None);
        assert_eq!(query.search(), None);
    }

    #[test]
    fn test_level_filter_parsed() {
        let query = SkillQuery {
            level: Some("advanced".to_string()),
            search: Some(" py ".to_string()),
        };
        assert_eq!(query.level().unwrap(), Some(SkillLevel::Advanced));
        assert_eq!(query.search(), Some("py"));
    }

    #[test]
    fn test_unknown_level_filter_is_field_error() {
        let query = SkillQuery {
            level: Some("expert".to_string()),
            search: None,
        };
        assert!(query.level().unwrap_err().contains("level"));
    }
}
