use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::directory::query::contains_pattern;
use crate::errors::AppError;
use crate::models::skill::{SkillLevel, SkillRow};
use crate::profiles::validation::{FieldError, FieldErrors};
use crate::skills::input::{NewSkill, SkillChanges};

/// The `(profile, name)` uniqueness constraint surfaces as a field error on
/// `nama_skill` instead of a storage failure.
fn translate_duplicate(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            FieldErrors::single("nama_skill", FieldError::DuplicateSkill).into()
        }
        _ => AppError::Database(e),
    }
}

pub async fn list_skills(
    pool: &PgPool,
    user_id: Uuid,
    level: Option<SkillLevel>,
    search: Option<&str>,
) -> Result<Vec<SkillRow>, AppError> {
    let rows = sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT s.*
        FROM skills s
        JOIN profiles p ON p.id = s.profile_id
        WHERE p.user_id = $1
          AND ($2::text IS NULL OR s.level = $2)
          AND ($3::text IS NULL OR s.name ILIKE $3)
        ORDER BY s.created_at, s.id
        "#,
    )
    .bind(user_id)
    .bind(level.map(|l| l.as_str()))
    .bind(search.map(contains_pattern))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// User who owns the skill's profile, if the skill exists.
pub async fn skill_owner(conn: &mut PgConnection, skill_id: Uuid) -> Result<Option<Uuid>, AppError> {
    let owner = sqlx::query_scalar(
        r#"
        SELECT p.user_id
        FROM skills s
        JOIN profiles p ON p.id = s.profile_id
        WHERE s.id = $1
        "#,
    )
    .bind(skill_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(owner)
}

pub async fn find_skill(conn: &mut PgConnection, skill_id: Uuid) -> Result<SkillRow, AppError> {
    sqlx::query_as::<_, SkillRow>("SELECT * FROM skills WHERE id = $1")
        .bind(skill_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Skill {skill_id} not found")))
}

pub async fn insert_skill(
    conn: &mut PgConnection,
    profile_id: Uuid,
    skill: &NewSkill,
) -> Result<SkillRow, AppError> {
    sqlx::query_as::<_, SkillRow>(
        r#"
        INSERT INTO skills (id, profile_id, name, level)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(profile_id)
    .bind(&skill.name)
    .bind(skill.level.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(translate_duplicate)
}

pub async fn update_skill(
    conn: &mut PgConnection,
    skill_id: Uuid,
    changes: &SkillChanges,
) -> Result<SkillRow, AppError> {
    sqlx::query_as::<_, SkillRow>(
        r#"
        UPDATE skills SET
            name  = COALESCE($2, name),
            level = COALESCE($3, level)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(skill_id)
    .bind(&changes.name)
    .bind(changes.level.map(|l| l.as_str()))
    .fetch_one(&mut *conn)
    .await
    .map_err(translate_duplicate)
}

/// Deletes the skill and returns the profile it belonged to.
pub async fn delete_skill(conn: &mut PgConnection, skill_id: Uuid) -> Result<Uuid, AppError> {
    sqlx::query_scalar("DELETE FROM skills WHERE id = $1 RETURNING profile_id")
        .bind(skill_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Skill {skill_id} not found")))
}
