use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

/// Inputs the activation rule depends on, read in one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ActivationInputs {
    pub has_photo: bool,
    pub skill_count: i64,
    pub experience_count: i64,
}

impl ActivationInputs {
    /// A profile is publicly listed only with a photo, a skill and an experience.
    pub fn is_complete(&self) -> bool {
        self.has_photo && self.skill_count > 0 && self.experience_count > 0
    }

    /// Wire names of the requirements that are still unmet.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_photo {
            missing.push("foto");
        }
        if self.skill_count == 0 {
            missing.push("skills");
        }
        if self.experience_count == 0 {
            missing.push("experiences");
        }
        missing
    }
}

/// Recomputes and persists `is_active` for a profile.
///
/// Must run on the same connection/transaction as the mutation that triggered
/// it. The profile row is locked so the read-modify-write is atomic.
pub async fn recompute_active(conn: &mut PgConnection, profile_id: Uuid) -> Result<bool, AppError> {
    let inputs: ActivationInputs = sqlx::query_as(
        r#"
        SELECT
            p.photo_key IS NOT NULL AS has_photo,
            (SELECT COUNT(*) FROM skills s WHERE s.profile_id = p.id) AS skill_count,
            (SELECT COUNT(*) FROM experiences e WHERE e.profile_id = p.id) AS experience_count
        FROM profiles p
        WHERE p.id = $1
        FOR UPDATE OF p
        "#,
    )
    .bind(profile_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;

    let active = inputs.is_complete();

    sqlx::query("UPDATE profiles SET is_active = $1, updated_at = now() WHERE id = $2")
        .bind(active)
        .bind(profile_id)
        .execute(&mut *conn)
        .await?;

    debug!(
        "Profile {profile_id} active={active} (missing: {:?})",
        inputs.missing()
    );
    Ok(active)
}
