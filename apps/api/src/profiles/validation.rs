//! Field-level validation and normalization rules.
//!
//! Every rule is a pure function from an input value to either the normalized
//! value or a [`FieldError`]. Handlers collect failures per wire field in a
//! [`FieldErrors`] so one response reports every invalid field at once.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Country code used when rewriting a local trunk-prefixed number.
pub const COUNTRY_CODE: &str = "62";
const TRUNK_PREFIX: char = '0';
const SUBSCRIBER_DIGITS_MIN: usize = 9;
const SUBSCRIBER_DIGITS_MAX: usize = 13;

pub const NAME_MIN_CHARS: usize = 3;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const YEAR_MIN: i32 = 1900;
pub const YEAR_MAX: i32 = 2100;

pub const NAME_MAX_CHARS: usize = 100;
pub const PROGRAM_MAX_CHARS: usize = 100;
pub const HANDLE_MAX_CHARS: usize = 100;
pub const SKILL_NAME_MAX_CHARS: usize = 100;
pub const TITLE_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Phone number must start with 62 followed by 9 to 13 digits.")]
    InvalidPhoneFormat,

    #[error("Handle must not contain '@' or whitespace.")]
    InvalidHandle,

    #[error("Cohort year must be exactly 4 digits.")]
    InvalidCohortYear,

    #[error("Must be at least {min} characters.")]
    TooShort { min: usize },

    #[error("Must be at most {max} characters.")]
    TooLong { max: usize },

    #[error("This field may not be blank.")]
    Blank,

    #[error("Year must be between {min} and {max}.")]
    YearOutOfRange { min: i32, max: i32 },

    #[error("Enter a valid email address.")]
    InvalidEmail,

    #[error("This skill already exists.")]
    DuplicateSkill,

    #[error("This field is required.")]
    Required,

    #[error("Not a valid string.")]
    NotAString,

    #[error("A valid integer is required.")]
    NotAnInteger,

    #[error("\"{0}\" is not a valid choice.")]
    InvalidChoice(String),

    #[error("{0}")]
    Other(String),
}

/// Field-addressable validation failures, keyed by wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: &str, error: FieldError) -> Self {
        let mut errors = Self::default();
        errors.add(field, error);
        errors
    }

    pub fn add(&mut self, field: &str, error: FieldError) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(error.to_string());
    }

    /// Runs `result`, recording its error under `field`. Returns the value on success.
    pub fn check<T>(&mut self, field: &str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str(" | ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

/// Presence check for fields a create request must carry.
pub fn required<T>(value: Option<T>) -> Result<T, FieldError> {
    value.ok_or(FieldError::Required)
}

/// Reads a JSON scalar as text. Numbers are taken in their decimal form.
pub fn json_text(value: Value) -> Result<String, FieldError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(FieldError::NotAString),
    }
}

/// Reads a JSON number, or a string holding one, as an `i32`.
pub fn json_integer(value: Value) -> Result<i32, FieldError> {
    let parsed = match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(FieldError::NotAnInteger)
}

/// Reads one of a fixed set of wire values, e.g. a skill level.
pub fn json_choice<T: FromStr>(value: Value) -> Result<T, FieldError> {
    let raw = json_text(value)?;
    raw.parse().map_err(|_| FieldError::InvalidChoice(raw))
}

/// Normalizes a WhatsApp/phone number to international form.
///
/// Whitespace is stripped, a leading `0` is replaced with `62`, and the result
/// must be `62` followed by 9–13 digits. Empty input stays empty.
pub fn normalize_phone(raw: &str) -> Result<String, FieldError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(compact);
    }

    let normalized = match compact.strip_prefix(TRUNK_PREFIX) {
        Some(rest) => format!("{COUNTRY_CODE}{rest}"),
        None => compact,
    };

    let subscriber = normalized
        .strip_prefix(COUNTRY_CODE)
        .ok_or(FieldError::InvalidPhoneFormat)?;
    let digits_ok = subscriber.chars().all(|c| c.is_ascii_digit());
    let len_ok = (SUBSCRIBER_DIGITS_MIN..=SUBSCRIBER_DIGITS_MAX).contains(&subscriber.len());
    if !digits_ok || !len_ok {
        return Err(FieldError::InvalidPhoneFormat);
    }

    Ok(normalized)
}

/// Social handle without the leading `@`, e.g. an Instagram username.
pub fn validate_handle(raw: &str) -> Result<String, FieldError> {
    if raw.contains('@') || raw.chars().any(char::is_whitespace) {
        return Err(FieldError::InvalidHandle);
    }
    check_max_chars(raw, HANDLE_MAX_CHARS)
}

pub fn validate_cohort(raw: &str) -> Result<String, FieldError> {
    if raw.is_empty() {
        return Ok(String::new());
    }
    if raw.len() != 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::InvalidCohortYear);
    }
    Ok(raw.to_string())
}

pub fn validate_name(raw: &str) -> Result<String, FieldError> {
    if raw.chars().count() < NAME_MIN_CHARS {
        return Err(FieldError::TooShort {
            min: NAME_MIN_CHARS,
        });
    }
    check_max_chars(raw, NAME_MAX_CHARS)
}

pub fn validate_program(raw: &str) -> Result<String, FieldError> {
    check_max_chars(raw, PROGRAM_MAX_CHARS)
}

/// Free-form profile link (LinkedIn username or URL).
pub fn validate_link(raw: &str) -> Result<String, FieldError> {
    check_max_chars(raw.trim(), HANDLE_MAX_CHARS)
}

pub fn validate_title(raw: &str) -> Result<String, FieldError> {
    if raw.trim().is_empty() {
        return Err(FieldError::Blank);
    }
    check_max_chars(raw, TITLE_MAX_CHARS)
}

pub fn validate_description(raw: &str) -> Result<String, FieldError> {
    if raw.trim().chars().count() < DESCRIPTION_MIN_CHARS {
        return Err(FieldError::TooShort {
            min: DESCRIPTION_MIN_CHARS,
        });
    }
    Ok(raw.to_string())
}

pub fn validate_start_year(year: i32) -> Result<i32, FieldError> {
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(FieldError::YearOutOfRange {
            min: YEAR_MIN,
            max: YEAR_MAX,
        });
    }
    Ok(year)
}

pub fn validate_skill_name(raw: &str) -> Result<String, FieldError> {
    if raw.trim().is_empty() {
        return Err(FieldError::Blank);
    }
    check_max_chars(raw, SKILL_NAME_MAX_CHARS)
}

/// Loose shape check: one `@`, a non-empty local part, and a dotted domain.
pub fn validate_email(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let (local, domain) = trimmed.split_once('@').ok_or(FieldError::InvalidEmail)?;
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok || trimmed.chars().any(char::is_whitespace) {
        return Err(FieldError::InvalidEmail);
    }
    check_max_chars(trimmed, EMAIL_MAX_CHARS)
}

fn check_max_chars(raw: &str, max: usize) -> Result<String, FieldError> {
    if raw.chars().count() > max {
        return Err(FieldError::TooLong { max });
    }
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_local_prefix_rewritten() {
        assert_eq!(normalize_phone("081234567890").unwrap(), "6281234567890");
    }

    #[test]
    fn test_phone_international_unchanged() {
        assert_eq!(normalize_phone("6281234567890").unwrap(), "6281234567890");
    }

    #[test]
    fn test_phone_too_short_rejected() {
        assert_eq!(normalize_phone("12345"), Err(FieldError::InvalidPhoneFormat));
    }

    #[test]
    fn test_phone_whitespace_stripped() {
        assert_eq!(normalize_phone(" 0812 3456 7890 ").unwrap(), "6281234567890");
    }

    #[test]
    fn test_phone_is_idempotent() {
        for raw in ["081234567890", "6281234567890", "0812 345 678 901", "62812345678"] {
            let once = normalize_phone(raw).unwrap();
            let twice = normalize_phone(&once).unwrap();
            assert_eq!(once, twice, "normalizing {raw} twice changed the value");
        }
    }

    #[test]
    fn test_phone_digit_bounds() {
        // 62 + 9 digits is the shortest accepted number, 62 + 13 the longest.
        assert!(normalize_phone("62123456789").is_ok());
        assert!(normalize_phone("621234567890123").is_ok());
        assert!(normalize_phone("6212345678").is_err());
        assert!(normalize_phone("6212345678901234").is_err());
    }

    #[test]
    fn test_phone_rejects_non_digits_and_foreign_codes() {
        assert!(normalize_phone("+6281234567890").is_err());
        assert!(normalize_phone("62812-3456-7890").is_err());
        assert!(normalize_phone("4412345678901").is_err());
    }

    #[test]
    fn test_phone_empty_allowed() {
        assert_eq!(normalize_phone("").unwrap(), "");
        assert_eq!(normalize_phone("   ").unwrap(), "");
    }

    #[test]
    fn test_handle_rules() {
        assert_eq!(validate_handle("budi.dev").unwrap(), "budi.dev");
        assert_eq!(validate_handle("@budi"), Err(FieldError::InvalidHandle));
        assert_eq!(validate_handle("budi dev"), Err(FieldError::InvalidHandle));
        assert_eq!(validate_handle("budi\tdev"), Err(FieldError::InvalidHandle));
        assert!(validate_handle("").is_ok());
    }

    #[test]
    fn test_cohort_rules() {
        assert_eq!(validate_cohort("").unwrap(), "");
        assert_eq!(validate_cohort("2021").unwrap(), "2021");
        assert_eq!(validate_cohort("21"), Err(FieldError::InvalidCohortYear));
        assert_eq!(validate_cohort("20a1"), Err(FieldError::InvalidCohortYear));
        assert_eq!(validate_cohort("20211"), Err(FieldError::InvalidCohortYear));
    }

    #[test]
    fn test_name_minimum_length() {
        assert!(validate_name("Ani").is_ok());
        assert_eq!(validate_name("Al"), Err(FieldError::TooShort { min: 3 }));
        // Counted in characters, not bytes.
        assert!(validate_name("Zoë").is_ok());
    }

    #[test]
    fn test_name_maximum_length() {
        assert!(validate_name(&"a".repeat(100)).is_ok());
        assert_eq!(
            validate_name(&"a".repeat(101)),
            Err(FieldError::TooLong { max: 100 })
        );
    }

    #[test]
    fn test_title_blank_rejected() {
        assert_eq!(validate_title("   "), Err(FieldError::Blank));
        assert!(validate_title("Ketua BEM").is_ok());
    }

    #[test]
    fn test_description_trimmed_minimum() {
        assert!(validate_description("Memimpin 30 anggota").is_ok());
        assert_eq!(
            validate_description("   short    "),
            Err(FieldError::TooShort { min: 10 })
        );
    }

    #[test]
    fn test_start_year_bounds() {
        assert!(validate_start_year(1900).is_ok());
        assert!(validate_start_year(2100).is_ok());
        assert!(validate_start_year(1899).is_err());
        assert!(validate_start_year(2101).is_err());
    }

    #[test]
    fn test_email_shape() {
        assert_eq!(validate_email("").unwrap(), "");
        assert!(validate_email("budi@ums.ac.id").is_ok());
        assert_eq!(validate_email("budi"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("@ums.ac.id"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("budi@localhost"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("a@b@c.id"), Err(FieldError::InvalidEmail));
    }

    #[test]
    fn test_skill_name_blank_rejected() {
        assert_eq!(validate_skill_name(" "), Err(FieldError::Blank));
        assert!(validate_skill_name("Python").is_ok());
    }

    #[test]
    fn test_field_errors_collects_per_field() {
        let mut errors = FieldErrors::default();
        assert!(errors.check("nama", validate_name("Ani")).is_some());
        assert!(errors.check("kontak_wa", normalize_phone("12345")).is_none());
        assert!(errors.check("angkatan", validate_cohort("99")).is_none());

        assert!(errors.contains("kontak_wa"));
        assert!(errors.contains("angkatan"));
        assert!(!errors.contains("nama"));

        let json = serde_json::to_value(&errors).unwrap();
        assert!(json["kontak_wa"].is_array());
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_json_scalars_coerced_or_rejected() {
        use serde_json::json;
        assert_eq!(json_text(json!("Budi")).unwrap(), "Budi");
        assert_eq!(json_text(json!(2021)).unwrap(), "2021");
        assert_eq!(json_text(json!({"a": 1})), Err(FieldError::NotAString));
        assert_eq!(json_integer(json!(2023)).unwrap(), 2023);
        assert_eq!(json_integer(json!(" 2023 ")).unwrap(), 2023);
        assert_eq!(json_integer(json!(20.5)), Err(FieldError::NotAnInteger));
        assert_eq!(json_integer(json!(true)), Err(FieldError::NotAnInteger));
        assert_eq!(json_integer(json!(1u64 << 40)), Err(FieldError::NotAnInteger));
    }

    #[test]
    fn test_json_choice_names_rejected_value() {
        use crate::models::skill::SkillLevel;
        assert_eq!(
            json_choice::<SkillLevel>(serde_json::json!("advanced")).unwrap(),
            SkillLevel::Advanced
        );
        assert_eq!(
            json_choice::<SkillLevel>(serde_json::json!("expert")),
            Err(FieldError::InvalidChoice("expert".to_string()))
        );
    }
}
