use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of experience. Wire values follow the frontend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceType {
    #[serde(rename = "organisasi")]
    Organization,
    #[serde(rename = "lomba")]
    Competition,
    #[serde(rename = "kerja")]
    Work,
}

impl ExperienceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceType::Organization => "organisasi",
            ExperienceType::Competition => "lomba",
            ExperienceType::Work => "kerja",
        }
    }
}

impl FromStr for ExperienceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organisasi" => Ok(ExperienceType::Organization),
            "lomba" => Ok(ExperienceType::Competition),
            "kerja" => Ok(ExperienceType::Work),
            other => Err(format!("\"{other}\" is not a valid type.")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceRow {
    pub id: Uuid,
    #[serde(rename = "profile")]
    pub profile_id: Uuid,
    #[serde(rename = "judul")]
    pub title: String,
    #[serde(rename = "deskripsi")]
    pub description: String,
    #[serde(rename = "tipe")]
    pub experience_type: String,
    #[serde(rename = "tahun_mulai")]
    pub start_year: i32,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_type_wire_names() {
        let parsed: ExperienceType = serde_json::from_str("\"lomba\"").unwrap();
        assert_eq!(parsed, ExperienceType::Competition);
        assert_eq!(
            serde_json::to_value(ExperienceType::Organization).unwrap(),
            ExperienceType::Organization.as_str()
        );
        assert!(serde_json::from_str::<ExperienceType>("\"competition\"").is_err());
        assert_eq!("kerja".parse::<ExperienceType>(), Ok(ExperienceType::Work));
        assert!("magang".parse::<ExperienceType>().is_err());
    }
}
