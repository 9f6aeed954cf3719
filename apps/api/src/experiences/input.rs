use serde::Deserialize;
use serde_json::Value;

use crate::models::experience::ExperienceType;
use crate::profiles::validation::{
    json_choice, json_integer, json_text, required, validate_description, validate_start_year,
    validate_title, FieldError, FieldErrors,
};

/// Experience request body, kept as raw JSON values until validated.
#[derive(Debug, Default, Deserialize)]
pub struct ExperienceInput {
    pub judul: Option<Value>,
    pub deskripsi: Option<Value>,
    pub tipe: Option<Value>,
    pub tahun_mulai: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExperience {
    pub title: String,
    pub description: String,
    pub experience_type: ExperienceType,
    pub start_year: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExperienceChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub experience_type: Option<ExperienceType>,
    pub start_year: Option<i32>,
}

fn title(raw: Value) -> Result<String, FieldError> {
    json_text(raw).and_then(|t| validate_title(&t))
}

fn description(raw: Value) -> Result<String, FieldError> {
    json_text(raw).and_then(|d| validate_description(&d))
}

fn start_year(raw: Value) -> Result<i32, FieldError> {
    json_integer(raw).and_then(validate_start_year)
}

impl ExperienceInput {
    /// Create: every field is required. All failures are reported together.
    pub fn into_new(self) -> Result<NewExperience, FieldErrors> {
        let mut errors = FieldErrors::default();
        let title = errors.check("judul", required(self.judul).and_then(title));
        let description =
            errors.check("deskripsi", required(self.deskripsi).and_then(description));
        let experience_type = errors.check("tipe", required(self.tipe).and_then(json_choice));
        let start_year =
            errors.check("tahun_mulai", required(self.tahun_mulai).and_then(start_year));

        match (title, description, experience_type, start_year) {
            (Some(title), Some(description), Some(experience_type), Some(start_year))
                if errors.is_empty() =>
            {
                Ok(NewExperience {
                    title,
                    description,
                    experience_type,
                    start_year,
                })
            }
            _ => Err(errors),
        }
    }

    /// Update: only supplied fields are validated and changed.
    pub fn into_changes(self) -> Result<ExperienceChanges, FieldErrors> {
        let mut errors = FieldErrors::default();
        let changes = ExperienceChanges {
            title: self.judul.and_then(|v| errors.check("judul", title(v))),
            description: self
                .deskripsi
                .and_then(|v| errors.check("deskripsi", description(v))),
            experience_type: self.tipe.and_then(|v| errors.check("tipe", json_choice(v))),
            start_year: self
                .tahun_mulai
                .and_then(|v| errors.check("tahun_mulai", start_year(v))),
        };
        errors.into_result()?;
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> ExperienceInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_complete_input_accepted() {
        let new = input(json!({
            "judul": "Ketua Himpunan",
            "deskripsi": "Memimpin himpunan mahasiswa selama satu periode",
            "tipe": "organisasi",
            "tahun_mulai": 2022
        }))
        .into_new()
        .unwrap();
        assert_eq!(new.title, "Ketua Himpunan");
        assert_eq!(new.experience_type, ExperienceType::Organization);
        assert_eq!(new.start_year, 2022);
    }

    #[test]
    fn test_all_failures_reported_together() {
        let errors = input(json!({
            "judul": "   ",
            "deskripsi": "singkat",
            "tahun_mulai": 1800
        }))
        .into_new()
        .unwrap_err();
        assert!(errors.contains("judul"));
        assert!(errors.contains("deskripsi"));
        assert!(errors.contains("tipe"));
        assert!(errors.contains("tahun_mulai"));
    }

    #[test]
    fn test_year_bounds_inclusive() {
        let base = |year: i32| {
            input(json!({
                "judul": "Juara 1",
                "deskripsi": "Lomba pemrograman tingkat nasional",
                "tipe": "lomba",
                "tahun_mulai": year
            }))
            .into_new()
        };
        assert!(base(1900).is_ok());
        assert!(base(2100).is_ok());
        assert!(base(1899).is_err());
        assert!(base(2101).is_err());
    }

    #[test]
    fn test_changes_validate_only_supplied_fields() {
        let changes = input(json!({ "tipe": "kerja" })).into_changes().unwrap();
        assert_eq!(changes.experience_type, Some(ExperienceType::Work));
        assert!(changes.title.is_none());

        let errors = input(json!({ "deskripsi": "pendek" }))
            .into_changes()
            .unwrap_err();
        assert!(errors.contains("deskripsi"));
        assert!(!errors.contains("judul"));
    }

    #[test]
    fn test_unknown_type_and_bad_year_are_field_errors() {
        let errors = input(json!({
            "judul": "Magang Backend",
            "deskripsi": "Membangun layanan internal perusahaan",
            "tipe": "magang",
            "tahun_mulai": "dua ribu"
        }))
        .into_new()
        .unwrap_err();
        assert!(errors.contains("tipe"));
        assert!(errors.contains("tahun_mulai"));
        assert!(!errors.contains("judul"));

        let errors = input(json!({ "tipe": "magang" })).into_changes().unwrap_err();
        assert!(errors.contains("tipe"));
    }
}
