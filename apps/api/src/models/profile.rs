use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub program: String,
    pub cohort: String,
    pub bio: String,
    /// Blob-store key of the uploaded photo.
    pub photo_key: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub instagram: String,
    pub linkedin: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin listing row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileSummaryRow {
    pub id: Uuid,
    pub username: String,
    #[serde(rename = "kontak_email")]
    pub email: String,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "prodi")]
    pub program: String,
    pub is_active: bool,
}
