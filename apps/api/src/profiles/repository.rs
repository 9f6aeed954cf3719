use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::profiles::completeness::recompute_active;
use crate::profiles::patch::ProfileChanges;
use crate::profiles::validation::NAME_MAX_CHARS;

/// Name a fresh profile starts with: the username, cut to the name column width.
pub fn default_profile_name(username: &str) -> String {
    username.chars().take(NAME_MAX_CHARS).collect()
}

/// Mirrors the gateway identity into `users`, refreshing username and e-mail.
pub async fn upsert_user(conn: &mut PgConnection, user: &CurrentUser) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
            SET username = EXCLUDED.username, email = EXCLUDED.email
        "#,
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Returns the caller's profile, creating it with defaults on first access.
///
/// Idempotent. A fresh profile takes its name from the username and its
/// contact e-mail from the account, with everything else empty and inactive.
pub async fn get_or_create_profile(
    conn: &mut PgConnection,
    user: &CurrentUser,
) -> Result<ProfileRow, AppError> {
    upsert_user(conn, user).await?;

    let created = sqlx::query(
        r#"
        INSERT INTO profiles (id, user_id, name, contact_email)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(default_profile_name(&user.username))
    .bind(&user.email)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if created > 0 {
        info!("Created profile for user {}", user.id);
    }

    let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(profile)
}

/// Applies validated changes and recomputes activation on the same connection.
pub async fn apply_changes(
    conn: &mut PgConnection,
    profile_id: Uuid,
    changes: &ProfileChanges,
) -> Result<ProfileRow, AppError> {
    sqlx::query(
        r#"
        UPDATE profiles SET
            name          = COALESCE($2, name),
            program       = COALESCE($3, program),
            cohort        = COALESCE($4, cohort),
            bio           = COALESCE($5, bio),
            contact_email = COALESCE($6, contact_email),
            contact_phone = COALESCE($7, contact_phone),
            instagram     = COALESCE($8, instagram),
            linkedin      = COALESCE($9, linkedin),
            updated_at    = now()
        WHERE id = $1
        "#,
    )
    .bind(profile_id)
    .bind(&changes.name)
    .bind(&changes.program)
    .bind(&changes.cohort)
    .bind(&changes.bio)
    .bind(&changes.contact_email)
    .bind(&changes.contact_phone)
    .bind(&changes.instagram)
    .bind(&changes.linkedin)
    .execute(&mut *conn)
    .await?;

    recompute_active(conn, profile_id).await?;

    let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(profile)
}

/// Points the profile at a new photo (or none) and recomputes activation.
/// Returns the row and the previously referenced key, if any.
pub async fn replace_photo(
    conn: &mut PgConnection,
    profile_id: Uuid,
    photo_key: Option<&str>,
) -> Result<(ProfileRow, Option<String>), AppError> {
    let previous: Option<String> =
        sqlx::query_scalar("SELECT photo_key FROM profiles WHERE id = $1 FOR UPDATE")
            .bind(profile_id)
            .fetch_one(&mut *conn)
            .await?;

    sqlx::query("UPDATE profiles SET photo_key = $2, updated_at = now() WHERE id = $1")
        .bind(profile_id)
        .bind(photo_key)
        .execute(&mut *conn)
        .await?;

    recompute_active(conn, profile_id).await?;

    let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok((profile, previous))
}

/// Deletes the account; profile, skills and experiences go with it via
/// `ON DELETE CASCADE`. Returns the photo key that is no longer referenced.
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, AppError> {
    let mut tx = pool.begin().await?;

    let photo_key: Option<String> =
        sqlx::query_scalar("SELECT photo_key FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .flatten();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Deleted user {user_id} and their profile");
    Ok(photo_key)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use sqlx::PgPool;
    use uuid::Uuid;

    use super::*;
    use crate::experiences::input::NewExperience;
    use crate::experiences::repository::insert_experience;
    use crate::models::experience::ExperienceType;
    use crate::models::skill::SkillLevel;
    use crate::skills::input::NewSkill;
    use crate::skills::repository::insert_skill;

    pub fn user(username: &str) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@ums.ac.id"),
            is_admin: false,
        }
    }

    pub fn new_skill(name: &str) -> NewSkill {
        NewSkill {
            name: name.to_string(),
            level: SkillLevel::Intermediate,
        }
    }

    pub fn new_experience() -> NewExperience {
        NewExperience {
            title: "Asisten Praktikum".to_string(),
            description: "Membimbing praktikum basis data".to_string(),
            experience_type: ExperienceType::Work,
            start_year: 2023,
        }
    }

    /// A listed profile: photo, one experience and the given skills.
    pub async fn complete_profile(pool: &PgPool, username: &str, skills: &[&str]) -> ProfileRow {
        let mut tx = pool.begin().await.unwrap();
        let profile = get_or_create_profile(&mut tx, &user(username)).await.unwrap();
        for name in skills {
            insert_skill(&mut tx, profile.id, &new_skill(name)).await.unwrap();
        }
        insert_experience(&mut tx, profile.id, &new_experience())
            .await
            .unwrap();
        let key = format!("photos/{}/foto.png", profile.id);
        let (profile, _) = replace_photo(&mut tx, profile.id, Some(key.as_str())).await.unwrap();
        tx.commit().await.unwrap();
        profile
    }

    /// A profile with skills and experience but no photo, so never listed.
    pub async fn incomplete_profile(pool: &PgPool, username: &str, skills: &[&str]) -> ProfileRow {
        let mut tx = pool.begin().await.unwrap();
        let profile = get_or_create_profile(&mut tx, &user(username)).await.unwrap();
        for name in skills {
            insert_skill(&mut tx, profile.id, &new_skill(name)).await.unwrap();
        }
        insert_experience(&mut tx, profile.id, &new_experience())
            .await
            .unwrap();
        recompute_active(&mut tx, profile.id).await.unwrap();
        tx.commit().await.unwrap();
        profile
    }
}
