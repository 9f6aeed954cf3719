use serde::Deserialize;
use serde_json::Value;

use crate::models::skill::SkillLevel;
use crate::profiles::validation::{
    json_choice, json_text, required, validate_skill_name, FieldErrors,
};

/// Skill request body. Values stay raw JSON so type and choice errors land
/// in `FieldErrors` next to the rule failures.
#[derive(Debug, Default, Deserialize)]
pub struct SkillInput {
    pub nama_skill: Option<Value>,
    pub level: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSkill {
    pub name: String,
    pub level: SkillLevel,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SkillChanges {
    pub name: Option<String>,
    pub level: Option<SkillLevel>,
}

impl SkillInput {
    /// Create: the name is required, the level defaults to beginner.
    pub fn into_new(self) -> Result<NewSkill, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = errors.check(
            "nama_skill",
            required(self.nama_skill)
                .and_then(json_text)
                .and_then(|name| validate_skill_name(&name)),
        );
        let level = match self.level {
            Some(raw) => errors.check("level", json_choice(raw)),
            None => Some(SkillLevel::default()),
        };

        match (name, level) {
            (Some(name), Some(level)) if errors.is_empty() => Ok(NewSkill { name, level }),
            _ => Err(errors),
        }
    }

    /// Update: only supplied fields change.
    pub fn into_changes(self) -> Result<SkillChanges, FieldErrors> {
        let mut errors = FieldErrors::default();
        let changes = SkillChanges {
            name: self.nama_skill.and_then(|raw| {
                errors.check(
                    "nama_skill",
                    json_text(raw).and_then(|name| validate_skill_name(&name)),
                )
            }),
            level: self
                .level
                .and_then(|raw| errors.check("level", json_choice(raw))),
        };
        errors.into_result()?;
        Ok(changes)
    }
}
