use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::profile::ProfileRow;
use crate::profiles::photo::PhotoStore;
use crate::profiles::validation::{
    json_text, normalize_phone, validate_cohort, validate_email, validate_handle, validate_link,
    validate_name, validate_program, FieldError, FieldErrors,
};

/// PATCH /profile/me body. Absent fields are left untouched; `is_active` and
/// `foto` are not client-settable and are ignored if sent. Values are raw JSON
/// so a wrong type is reported per field.
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub nama: Option<Value>,
    pub prodi: Option<Value>,
    pub angkatan: Option<Value>,
    pub bio: Option<Value>,
    pub kontak_email: Option<Value>,
    pub kontak_wa: Option<Value>,
    pub instagram: Option<Value>,
    pub linkedin: Option<Value>,
}

type TextRule = fn(&str) -> Result<String, FieldError>;

/// A patch whose every present field passed validation and normalization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub program: Option<String>,
    pub cohort: Option<String>,
    pub bio: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
}

impl ProfilePatch {
    /// Validates every supplied field, collecting all failures.
    pub fn validate(self) -> Result<ProfileChanges, FieldErrors> {
        let mut errors = FieldErrors::default();

        let mut field = |name: &str, raw: Option<Value>, rule: TextRule| {
            raw.and_then(|v| errors.check(name, json_text(v).and_then(|text| rule(&text))))
        };

        let changes = ProfileChanges {
            name: field("nama", self.nama, validate_name),
            program: field("prodi", self.prodi, validate_program),
            cohort: field("angkatan", self.angkatan, validate_cohort),
            bio: field("bio", self.bio, |bio| Ok(bio.to_string())),
            contact_email: field("kontak_email", self.kontak_email, validate_email),
            contact_phone: field("kontak_wa", self.kontak_wa, normalize_phone),
            instagram: field("instagram", self.instagram, validate_handle),
            linkedin: field("linkedin", self.linkedin, validate_link),
        };

        errors.into_result()?;
        Ok(changes)
    }
}

/// Owner view of a profile, as returned by `/profile/me`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub nama: String,
    pub prodi: String,
    pub angkatan: String,
    pub bio: String,
    pub foto: Option<String>,
    pub kontak_email: String,
    pub kontak_wa: String,
    pub instagram: String,
    pub linkedin: String,
    pub is_active: bool,
}

impl ProfileResponse {
    pub fn from_row(row: ProfileRow, photos: &dyn PhotoStore) -> Self {
        ProfileResponse {
            id: row.id,
            foto: row.photo_key.as_deref().map(|key| photos.public_url(key)),
            nama: row.name,
            prodi: row.program,
            angkatan: row.cohort,
            bio: row.bio,
            kontak_email: row.contact_email,
            kontak_wa: row.contact_phone,
            instagram: row.instagram,
            linkedin: row.linkedin,
            is_active: row.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(json: serde_json::Value) -> ProfilePatch {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_valid_patch_normalizes_phone() {
        let changes = patch(serde_json::json!({
            "nama": "Budi Santoso",
            "kontak_wa": "0812 3456 7890",
            "angkatan": "2021"
        }))
        .validate()
        .unwrap();
        assert_eq!(changes.name.as_deref(), Some("Budi Santoso"));
        assert_eq!(changes.contact_phone.as_deref(), Some("6281234567890"));
        assert_eq!(changes.cohort.as_deref(), Some("2021"));
        assert_eq!(changes.bio, None);
    }

    #[test]
    fn test_invalid_fields_all_reported() {
        let errors = patch(serde_json::json!({
            "nama": "Bu",
            "kontak_wa": "12345",
            "instagram": "@budi",
            "angkatan": "21"
        }))
        .validate()
        .unwrap_err();
        for field in ["nama", "kontak_wa", "instagram", "angkatan"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_read_only_fields_ignored() {
        let changes = patch(serde_json::json!({
            "is_active": true,
            "foto": "http://evil.example/x.png",
            "bio": "Halo"
        }))
        .validate()
        .unwrap();
        assert_eq!(
            changes,
            ProfileChanges {
                bio: Some("Halo".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_wrong_json_types_reported_per_field() {
        let changes = patch(serde_json::json!({ "angkatan": 2021 }))
            .validate()
            .unwrap();
        assert_eq!(changes.cohort.as_deref(), Some("2021"));

        let errors = patch(serde_json::json!({
            "nama": ["Budi"],
            "bio": {"text": "Halo"},
            "kontak_wa": true
        }))
        .validate()
        .unwrap_err();
        for field in ["nama", "bio", "kontak_wa"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_empty_optional_fields_allowed() {
        let changes = patch(serde_json::json!({
            "kontak_wa": "",
            "angkatan": "",
            "instagram": "",
            "kontak_email": ""
        }))
        .validate()
        .unwrap();
        assert_eq!(changes.contact_phone.as_deref(), Some(""));
        assert_eq!(changes.cohort.as_deref(), Some(""));
    }
}
