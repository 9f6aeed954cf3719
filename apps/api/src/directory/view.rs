use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::directory::query::PublicProfileRow;
use crate::errors::AppError;
use crate::models::experience::ExperienceRow;
use crate::models::skill::SkillRow;
use crate::profiles::photo::PhotoStore;

/// Public projection of a profile. Shared by the directory endpoints and the
/// CV renderer.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    #[serde(skip)]
    pub profile_id: Uuid,
    pub username: String,
    pub nama: String,
    pub prodi: String,
    pub angkatan: String,
    pub bio: String,
    pub foto: Option<String>,
    #[serde(skip)]
    pub photo_key: Option<String>,
    pub kontak_email: String,
    pub kontak_wa: String,
    pub instagram: String,
    pub skills: Vec<SkillRow>,
    pub experiences: Vec<ExperienceRow>,
}

/// Attaches skills and experiences to their profiles.
///
/// Profile order is preserved; children keep the order they are given in.
/// Children whose profile is not in `rows` are dropped.
pub fn assemble_public_profiles(
    rows: Vec<PublicProfileRow>,
    skills: Vec<SkillRow>,
    experiences: Vec<ExperienceRow>,
    photos: &dyn PhotoStore,
) -> Vec<PublicProfile> {
    let mut skills_by_profile: HashMap<Uuid, Vec<SkillRow>> = HashMap::new();
    for skill in skills {
        skills_by_profile
            .entry(skill.profile_id)
            .or_default()
            .push(skill);
    }
    let mut experiences_by_profile: HashMap<Uuid, Vec<ExperienceRow>> = HashMap::new();
    for experience in experiences {
        experiences_by_profile
            .entry(experience.profile_id)
            .or_default()
            .push(experience);
    }

    rows.into_iter()
        .map(|row| PublicProfile {
            profile_id: row.id,
            skills: skills_by_profile.remove(&row.id).unwrap_or_default(),
            experiences: experiences_by_profile.remove(&row.id).unwrap_or_default(),
            foto: row.photo_key.as_deref().map(|key| photos.public_url(key)),
            photo_key: row.photo_key,
            username: row.username,
            nama: row.name,
            prodi: row.program,
            angkatan: row.cohort,
            bio: row.bio,
            kontak_email: row.contact_email,
            kontak_wa: row.contact_phone,
            instagram: row.instagram,
        })
        .collect()
}

/// Loads children for `rows` in two queries and assembles the public view.
pub async fn load_public_profiles(
    pool: &PgPool,
    rows: Vec<PublicProfileRow>,
    photos: &dyn PhotoStore,
) -> Result<Vec<PublicProfile>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let skills = sqlx::query_as::<_, SkillRow>(
        "SELECT * FROM skills WHERE profile_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let experiences = sqlx::query_as::<_, ExperienceRow>(
        "SELECT * FROM experiences WHERE profile_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    Ok(assemble_public_profiles(rows, skills, experiences, photos))
}

pub async fn load_public_profile(
    pool: &PgPool,
    row: PublicProfileRow,
    photos: &dyn PhotoStore,
) -> Result<PublicProfile, AppError> {
    let id = row.id;
    load_public_profiles(pool, vec![row], photos)
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}
