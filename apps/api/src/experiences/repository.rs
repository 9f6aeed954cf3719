use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::experiences::input::{ExperienceChanges, NewExperience};
use crate::models::experience::ExperienceRow;

pub async fn list_experiences(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ExperienceRow>, AppError> {
    let rows = sqlx::query_as::<_, ExperienceRow>(
        r#"
        SELECT e.*
        FROM experiences e
        JOIN profiles p ON p.id = e.profile_id
        WHERE p.user_id = $1
        ORDER BY e.created_at, e.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn experience_owner(
    conn: &mut PgConnection,
    experience_id: Uuid,
) -> Result<Option<Uuid>, AppError> {
    let owner = sqlx::query_scalar(
        r#"
        SELECT p.user_id
        FROM experiences e
        JOIN profiles p ON p.id = e.profile_id
        WHERE e.id = $1
        "#,
    )
    .bind(experience_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(owner)
}

pub async fn find_experience(
    conn: &mut PgConnection,
    experience_id: Uuid,
) -> Result<ExperienceRow, AppError> {
    sqlx::query_as::<_, ExperienceRow>("SELECT * FROM experiences WHERE id = $1")
        .bind(experience_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Experience {experience_id} not found")))
}

pub async fn insert_experience(
    conn: &mut PgConnection,
    profile_id: Uuid,
    experience: &NewExperience,
) -> Result<ExperienceRow, AppError> {
    let row = sqlx::query_as::<_, ExperienceRow>(
        r#"
        INSERT INTO experiences (id, profile_id, title, description, experience_type, start_year)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(profile_id)
    .bind(&experience.title)
    .bind(&experience.description)
    .bind(experience.experience_type.as_str())
    .bind(experience.start_year)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn update_experience(
    conn: &mut PgConnection,
    experience_id: Uuid,
    changes: &ExperienceChanges,
) -> Result<ExperienceRow, AppError> {
    let row = sqlx::query_as::<_, ExperienceRow>(
        r#"
        UPDATE experiences SET
            title           = COALESCE($2, title),
            description     = COALESCE($3, description),
            experience_type = COALESCE($4, experience_type),
            start_year      = COALESCE($5, start_year)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(experience_id)
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.experience_type.map(|t| t.as_str()))
    .bind(changes.start_year)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

/// Deletes the experience and returns the profile it belonged to.
pub async fn delete_experience(
    conn: &mut PgConnection,
    experience_id: Uuid,
) -> Result<Uuid, AppError> {
    sqlx::query_scalar("DELETE FROM experiences WHERE id = $1 RETURNING profile_id")
        .bind(experience_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Experience {experience_id} not found")))
}
