use serde::Deserialize;
use sqlx::PgPool;

use crate::errors::AppError;

/// Number of profiles returned by the "latest" listing.
pub const LATEST_LIMIT: i64 = 5;

/// Raw query string of `GET /talents/public`.
#[derive(Debug, Default, Deserialize)]
pub struct TalentQuery {
    pub search: Option<String>,
    pub skill: Option<String>,
    pub prodi: Option<String>,
}

/// Normalized directory filters. `None` means "no constraint".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectoryFilter {
    pub search: Option<String>,
    pub program: Option<String>,
    pub skill: Option<String>,
}

impl From<TalentQuery> for DirectoryFilter {
    fn from(query: TalentQuery) -> Self {
        DirectoryFilter {
            search: non_blank(query.search),
            program: non_blank(query.prodi),
            skill: non_blank(query.skill),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds an `ILIKE` pattern matching `term` anywhere, with LIKE
/// metacharacters in the term matched literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Flattened profile + username row backing the public view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublicProfileRow {
    pub id: uuid::Uuid,
    pub username: String,
    pub name: String,
    pub program: String,
    pub cohort: String,
    pub bio: String,
    pub photo_key: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub instagram: String,
}

const PUBLIC_COLUMNS: &str = r#"
    p.id, u.username, p.name, p.program, p.cohort, p.bio, p.photo_key,
    p.contact_email, p.contact_phone, p.instagram
"#;

/// Active profiles matching `filter`, in insertion order.
///
/// The skill filter is an `EXISTS` subquery, so a profile with several
/// matching skills is returned once.
pub async fn search_active(
    pool: &PgPool,
    filter: &DirectoryFilter,
) -> Result<Vec<PublicProfileRow>, AppError> {
    let sql = format!(
        r#"
        SELECT {PUBLIC_COLUMNS}
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE p.is_active
          AND ($1::text IS NULL
               OR p.name ILIKE $1 OR p.program ILIKE $1 OR u.username ILIKE $1)
          AND ($2::text IS NULL OR p.program ILIKE $2)
          AND ($3::text IS NULL OR EXISTS (
                SELECT 1 FROM skills s
                WHERE s.profile_id = p.id AND s.name ILIKE $3))
        ORDER BY p.created_at, p.id
        "#
    );

    let rows = sqlx::query_as::<_, PublicProfileRow>(&sql)
        .bind(filter.search.as_deref().map(contains_pattern))
        .bind(filter.program.as_deref().map(contains_pattern))
        .bind(filter.skill.as_deref().map(contains_pattern))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// The most recently created active profiles, newest first.
pub async fn latest_active(pool: &PgPool) -> Result<Vec<PublicProfileRow>, AppError> {
    let sql = format!(
        r#"
        SELECT {PUBLIC_COLUMNS}
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE p.is_active
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $1
        "#
    );

    let rows = sqlx::query_as::<_, PublicProfileRow>(&sql)
        .bind(LATEST_LIMIT)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Looks a profile up by username. Inactive profiles are reported exactly
/// like missing ones.
pub async fn find_active_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<PublicProfileRow, AppError> {
    let sql = format!(
        r#"
        SELECT {PUBLIC_COLUMNS}
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE u.username = $1 AND p.is_active
        "#
    );

    sqlx::query_as::<_, PublicProfileRow>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Talent not found".to_string()))
}

/// Public projection of the caller's own profile regardless of activation,
/// used for CV rendering.
pub async fn find_by_profile_id(
    pool: &PgPool,
    profile_id: uuid::Uuid,
) -> Result<PublicProfileRow, AppError> {
    let sql = format!(
        r#"
        SELECT {PUBLIC_COLUMNS}
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE p.id = $1
        "#
    );

    sqlx::query_as::<_, PublicProfileRow>(&sql)
        .bind(profile_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_ignored() {
        let filter = DirectoryFilter::from(TalentQuery {
            search: Some("   ".to_string()),
            skill: Some(String::new()),
            prodi: None,
        });
        assert_eq!(filter, DirectoryFilter::default());
    }

    #[test]
    fn test_filters_are_trimmed() {
        let filter = DirectoryFilter::from(TalentQuery {
            search: Some(" budi ".to_string()),
            skill: Some("java".to_string()),
            prodi: Some("Informatika".to_string()),
        });
        assert_eq!(filter.search.as_deref(), Some("budi"));
        assert_eq!(filter.skill.as_deref(), Some("java"));
        assert_eq!(filter.program.as_deref(), Some("Informatika"));
    }

    #[test]
    fn test_contains_pattern_wraps_term() {
        assert_eq!(contains_pattern("java"), "%java%");
    }

    #[test]
    fn test_contains_pattern_escapes_metacharacters() {
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("c_sharp"), "%c\\_sharp%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    mod stored {
        use super::super::*;
        use crate::profiles::repository::fixtures::{complete_profile, incomplete_profile};

        fn skill_filter(skill: &str) -> DirectoryFilter {
            DirectoryFilter {
                skill: Some(skill.to_string()),
                ..Default::default()
            }
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn test_inactive_profiles_never_listed(pool: PgPool) {
            let listed = complete_profile(&pool, "oki", &["Java"]).await;
            let hidden = incomplete_profile(&pool, "putri", &["Java"]).await;
            assert!(listed.is_active);
            assert!(!hidden.is_active);

            let all = search_active(&pool, &DirectoryFilter::default()).await.unwrap();
            assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![listed.id]);

            let by_skill = search_active(&pool, &skill_filter("java")).await.unwrap();
            assert_eq!(by_skill.len(), 1);

            let latest = latest_active(&pool).await.unwrap();
            assert_eq!(latest.iter().map(|r| r.id).collect::<Vec<_>>(), vec![listed.id]);

            assert!(find_active_by_username(&pool, "oki").await.is_ok());
            assert!(matches!(
                find_active_by_username(&pool, "putri").await,
                Err(AppError::NotFound(_))
            ));

            // The owner's own projection ignores activation
            let own = find_by_profile_id(&pool, hidden.id).await.unwrap();
            assert_eq!(own.username, "putri");
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn test_skill_filter_returns_each_profile_once(pool: PgPool) {
            let both = complete_profile(&pool, "rani", &["Java", "JavaScript"]).await;
            complete_profile(&pool, "sari", &["Python"]).await;

            let rows = search_active(&pool, &skill_filter("java")).await.unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].id, both.id);

            let rows = search_active(&pool, &skill_filter("JAVASCRIPT")).await.unwrap();
            assert_eq!(rows.len(), 1);
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn test_search_matches_username_and_escapes_wildcards(pool: PgPool) {
            complete_profile(&pool, "tono_dev", &["Rust"]).await;
            complete_profile(&pool, "tonoxdev", &["Rust"]).await;

            let filter = DirectoryFilter {
                search: Some("tono_".to_string()),
                ..Default::default()
            };
            let rows = search_active(&pool, &filter).await.unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].username, "tono_dev");
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn test_latest_is_capped_and_newest_first(pool: PgPool) {
            let mut ids = Vec::new();
            for i in 0..(LATEST_LIMIT + 2) {
                ids.push(complete_profile(&pool, &format!("user{i}"), &["SQL"]).await.id);
            }

            let latest = latest_active(&pool).await.unwrap();
            assert_eq!(latest.len() as i64, LATEST_LIMIT);
            assert_eq!(latest[0].id, *ids.last().unwrap());
        }
    }
}
