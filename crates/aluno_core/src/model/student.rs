//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical student record held by the registry.
//! - Provide birth-date formatting and age derivation helpers.
//! - Convert records to and from the flat five-field line shape.
//!
//! # Invariants
//! - Identity is the `id` field only; compare identity with [`ids_equal`].
//! - The flat line never carries `age`; it is recomputed from `birth_date`.
//! - This type performs no field validation. Callers validate input first
//!   (see `model::form`).

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Text format for persisted and displayed birth dates (`dd/mm/yyyy`).
pub const BIRTH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Number of fields in one flat line.
pub const FLAT_FIELD_COUNT: usize = 5;

const DAYS_PER_YEAR: i64 = 365;

/// Registry-wide unique student identifier ("matrícula").
pub type StudentId = String;

/// Canonical student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Primary key. Unique across the registry.
    pub id: StudentId,
    pub name: String,
    /// Whole years. Derived from `birth_date` unless explicitly overridden.
    pub age: u32,
    #[serde(with = "birth_date_text")]
    pub birth_date: NaiveDate,
    /// Free-form phone text.
    pub phone: String,
    /// National tax identifier, masked as `###.###.###-##`.
    pub tax_id: String,
}

/// Error produced when a flat line cannot be turned into a [`Student`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatRecordError {
    /// Line did not split into exactly five fields.
    FieldCount(usize),
    /// Birth date field is not `dd/mm/yyyy`.
    BirthDate(String),
}

impl Display for FlatRecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCount(found) => write!(
                f,
                "expected {FLAT_FIELD_COUNT} fields, found {found}"
            ),
            Self::BirthDate(value) => {
                write!(f, "invalid birth date `{value}`; expected dd/mm/yyyy")
            }
        }
    }
}

impl Error for FlatRecordError {}

impl Student {
    /// Creates a student whose age is derived from `birth_date` as of today.
    pub fn new(
        id: impl Into<StudentId>,
        name: impl Into<String>,
        birth_date: NaiveDate,
        phone: impl Into<String>,
        tax_id: impl Into<String>,
    ) -> Self {
        Self::new_as_of(id, name, birth_date, phone, tax_id, today())
    }

    /// Same as [`Student::new`] with an explicit reference date for age.
    pub fn new_as_of(
        id: impl Into<StudentId>,
        name: impl Into<String>,
        birth_date: NaiveDate,
        phone: impl Into<String>,
        tax_id: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age: age_on(birth_date, today),
            birth_date,
            phone: phone.into(),
            tax_id: tax_id.into(),
        }
    }

    /// Overrides the derived age.
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    /// Re-derives `age` from `birth_date` relative to `today`.
    pub fn recompute_age(&mut self, today: NaiveDate) {
        self.age = age_on(self.birth_date, today);
    }

    /// Returns whether this record carries the given identifier.
    pub fn has_id(&self, id: &str) -> bool {
        self.id == id
    }

    /// Birth date rendered as `dd/mm/yyyy`.
    pub fn formatted_birth_date(&self) -> String {
        self.birth_date.format(BIRTH_DATE_FORMAT).to_string()
    }

    /// Fields in flat-file order: id, name, birth date, phone, tax id.
    pub fn to_flat_fields(&self) -> [String; FLAT_FIELD_COUNT] {
        [
            self.id.clone(),
            self.name.clone(),
            self.formatted_birth_date(),
            self.phone.clone(),
            self.tax_id.clone(),
        ]
    }

    /// One flat line without trailing newline.
    pub fn to_line(&self) -> String {
        self.to_flat_fields().join(",")
    }

    /// Builds a student from flat fields, trimming each one and deriving age
    /// relative to `today`.
    ///
    /// # Errors
    /// - [`FlatRecordError::FieldCount`] when `fields.len() != 5`.
    /// - [`FlatRecordError::BirthDate`] when the date field does not parse.
    pub fn from_flat_fields<S: AsRef<str>>(
        fields: &[S],
        today: NaiveDate,
    ) -> Result<Self, FlatRecordError> {
        if fields.len() != FLAT_FIELD_COUNT {
            return Err(FlatRecordError::FieldCount(fields.len()));
        }

        let field = move |index: usize| fields[index].as_ref().trim();
        let birth_date = parse_birth_date(field(2))
            .map_err(|_| FlatRecordError::BirthDate(field(2).to_string()))?;

        Ok(Self::new_as_of(
            field(0),
            field(1),
            birth_date,
            field(3),
            field(4),
            today,
        ))
    }

    /// Parses one comma-delimited flat line.
    pub fn from_line(line: &str, today: NaiveDate) -> Result<Self, FlatRecordError> {
        let fields: Vec<&str> = line.split(',').collect();
        Self::from_flat_fields(&fields, today)
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} years | born {} | {} | {}",
            self.id,
            self.name,
            self.age,
            self.formatted_birth_date(),
            self.phone,
            self.tax_id
        )
    }
}

/// Identity comparison: two records denote the same student when their ids
/// match, regardless of the remaining fields.
pub fn ids_equal(a: &Student, b: &Student) -> bool {
    a.id == b.id
}

/// Parses a `dd/mm/yyyy` birth date.
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), BIRTH_DATE_FORMAT)
}

/// Whole years between `birth_date` and `today` using 365-day years.
///
/// Leap days are not accounted for, so the result can run ahead of the
/// calendar age by a day or so around birthdays. Birth dates in the future
/// yield `0`.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let days = today.signed_duration_since(birth_date).num_days();
    if days <= 0 {
        return 0;
    }
    u32::try_from(days / DAYS_PER_YEAR).unwrap_or(u32::MAX)
}

/// Calendar-correct whole years between `birth_date` and `today`.
pub fn calendar_age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Local calendar date used as the age reference point.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

mod birth_date_text {
    use super::BIRTH_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(BIRTH_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(text.trim(), BIRTH_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{age_on, calendar_age_on};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn age_uses_whole_365_day_years() {
        assert_eq!(age_on(date(2001, 1, 1), date(2001, 12, 31)), 0);
        assert_eq!(age_on(date(2015, 1, 10), date(2025, 1, 10)), 10);
    }

    #[test]
    fn age_runs_ahead_of_calendar_after_leap_days() {
        // 2000-03-01 .. 2024-02-27 spans 8763 days, which is 24 * 365 + 3.
        let birth = date(2000, 3, 1);
        let today = date(2024, 2, 27);
        assert_eq!(age_on(birth, today), 24);
        assert_eq!(calendar_age_on(birth, today), 23);
    }

    #[test]
    fn future_birth_date_is_age_zero() {
        assert_eq!(age_on(date(2030, 1, 1), date(2026, 1, 1)), 0);
        assert_eq!(calendar_age_on(date(2030, 1, 1), date(2026, 1, 1)), 0);
    }
}
