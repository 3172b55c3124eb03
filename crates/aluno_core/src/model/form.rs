//! Presentation-side student input.
//!
//! # Responsibility
//! - Hold raw text captured by a form or command line.
//! - Enforce required fields and input masks before a [`Student`] exists.
//!
//! # Invariants
//! - Every field is trimmed before checks.
//! - A tax id given as 11 bare digits is normalized to `###.###.###-##`.
//! - No field may contain the flat-file delimiter `,`.

use crate::model::student::{parse_birth_date, Student};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_MASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid date mask regex"));
static PHONE_MASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\d{2}\)\d{4,5}-\d{4}$").expect("valid phone mask regex"));
static TAX_ID_MASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").expect("valid tax id mask regex")
});
static TAX_ID_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{11}$").expect("valid tax id digits regex"));

/// Validation failure for form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Required field was empty after trimming.
    MissingField(&'static str),
    /// Field contains the flat-file delimiter and could not be stored.
    ContainsDelimiter(&'static str),
    /// Field does not match its input mask.
    InvalidMask {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Birth date matched the mask but is not a real calendar date.
    InvalidBirthDate(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "field `{field}` is required"),
            Self::ContainsDelimiter(field) => write!(f, "field `{field}` must not contain `,`"),
            Self::InvalidMask {
                field,
                value,
                expected,
            } => write!(f, "field `{field}` value `{value}` must match `{expected}`"),
            Self::InvalidBirthDate(value) => write!(f, "birth date `{value}` is not a valid date"),
        }
    }
}

impl Error for FormError {}

/// Raw student input, one string per form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub id: String,
    pub name: String,
    /// `dd/mm/yyyy`.
    pub birth_date: String,
    /// `(##)####-####` or `(##)#####-####`.
    pub phone: String,
    /// `###.###.###-##` or 11 bare digits.
    pub tax_id: String,
}

impl StudentForm {
    /// Validates all fields and builds a student aged as of today.
    pub fn into_student(self) -> Result<Student, FormError> {
        self.into_student_as_of(crate::model::student::today())
    }

    /// Validates all fields and builds a student aged as of `today`.
    ///
    /// Fields are checked in form order; the first failure is returned.
    pub fn into_student_as_of(self, today: NaiveDate) -> Result<Student, FormError> {
        let id = required("id", &self.id)?;
        let name = required("name", &self.name)?;

        let birth_text = required("birth_date", &self.birth_date)?;
        if !DATE_MASK_RE.is_match(birth_text) {
            return Err(FormError::InvalidMask {
                field: "birth_date",
                value: birth_text.to_string(),
                expected: "dd/mm/yyyy",
            });
        }
        let birth_date = parse_birth_date(birth_text)
            .map_err(|_| FormError::InvalidBirthDate(birth_text.to_string()))?;

        let phone = required("phone", &self.phone)?;
        if !PHONE_MASK_RE.is_match(phone) {
            return Err(FormError::InvalidMask {
                field: "phone",
                value: phone.to_string(),
                expected: "(##)#####-####",
            });
        }

        let tax_id = normalize_tax_id(required("tax_id", &self.tax_id)?)?;

        Ok(Student::new_as_of(
            id, name, birth_date, phone, tax_id, today,
        ))
    }
}

/// Applies the `###.###.###-##` mask to an already-masked or bare 11-digit
/// tax id.
pub fn normalize_tax_id(value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if TAX_ID_MASK_RE.is_match(value) {
        return Ok(value.to_string());
    }
    if TAX_ID_DIGITS_RE.is_match(value) {
        return Ok(format!(
            "{}.{}.{}-{}",
            &value[0..3],
            &value[3..6],
            &value[6..9],
            &value[9..11]
        ));
    }
    Err(FormError::InvalidMask {
        field: "tax_id",
        value: value.to_string(),
        expected: "###.###.###-##",
    })
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::MissingField(field));
    }
    if trimmed.contains(',') {
        return Err(FormError::ContainsDelimiter(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{normalize_tax_id, FormError, StudentForm};
    use chrono::NaiveDate;

    fn form() -> StudentForm {
        StudentForm {
            id: " 123 ".to_string(),
            name: "Jane Doe".to_string(),
            birth_date: "10/01/2015".to_string(),
            phone: "(86)3232-2525".to_string(),
            tax_id: "554.759.013-00".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
    }

    #[test]
    fn valid_form_builds_trimmed_student() {
        let student = form().into_student_as_of(today()).unwrap();
        assert_eq!(student.id, "123");
        assert_eq!(student.formatted_birth_date(), "10/01/2015");
        assert_eq!(student.age, 11);
    }

    #[test]
    fn missing_name_is_reported() {
        let mut input = form();
        input.name = "   ".to_string();
        let err = input.into_student_as_of(today()).unwrap_err();
        assert_eq!(err, FormError::MissingField("name"));
    }

    #[test]
    fn comma_in_name_is_rejected() {
        let mut input = form();
        input.name = "Silva, Ana".to_string();
        let err = input.into_student_as_of(today()).unwrap_err();
        assert_eq!(err, FormError::ContainsDelimiter("name"));
    }

    #[test]
    fn impossible_date_matches_mask_but_fails_parse() {
        let mut input = form();
        input.birth_date = "31/02/2015".to_string();
        let err = input.into_student_as_of(today()).unwrap_err();
        assert_eq!(err, FormError::InvalidBirthDate("31/02/2015".to_string()));
    }

    #[test]
    fn phone_accepts_eight_and_nine_digit_numbers() {
        let mut input = form();
        input.phone = "(86)99999-1234".to_string();
        assert!(input.into_student_as_of(today()).is_ok());

        let mut input = form();
        input.phone = "8632322525".to_string();
        let err = input.into_student_as_of(today()).unwrap_err();
        assert!(matches!(err, FormError::InvalidMask { field: "phone", .. }));
    }

    #[test]
    fn bare_tax_id_digits_get_masked() {
        assert_eq!(normalize_tax_id("55475901300").unwrap(), "554.759.013-00");
        assert!(normalize_tax_id("5547590130").is_err());
    }
}
