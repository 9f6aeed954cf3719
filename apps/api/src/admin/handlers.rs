//! Moderation endpoints. Every handler requires the `admin` role.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::profile::ProfileSummaryRow;
use crate::state::AppState;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ToggleResponse {
    pub id: Uuid,
    pub is_active: bool,
}

/// GET /admin/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ProfileSummaryRow>>, AppError> {
    let rows = sqlx::query_as::<_, ProfileSummaryRow>(
        r#"
        SELECT p.id, u.username, u.email, p.name, p.program, p.is_active
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        ORDER BY p.created_at, p.id
        "#,
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// PATCH /admin/profiles/{id}/toggle
///
/// Manual override of the computed flag. The next owner mutation recomputes it.
pub async fn handle_toggle_profile(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, AppError> {
    let toggled = sqlx::query_as::<_, ToggleResponse>(
        r#"
        UPDATE profiles SET is_active = NOT is_active, updated_at = now()
        WHERE id = $1
        RETURNING id, is_active
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))?;

    info!(
        "Admin {} set profile {} active={}",
        admin.username, toggled.id, toggled.is_active
    );
    Ok(Json(toggled))
}
