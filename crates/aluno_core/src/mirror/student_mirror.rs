//! Relational mirror contracts and SQLite implementation.
//!
//! # Responsibility
//! - Duplicate student create/update/delete into a relational table.
//! - Offer read-back queries for inspection and tests.
//!
//! # Invariants
//! - Every write runs in its own transaction; a failed write leaves no
//!   partial state behind.
//! - The mirror is never read to rebuild registry state.
//! - The SQLite connection is owned by the mirror and supplied at
//!   construction time.

use crate::db::DbError;
use crate::model::student::{Student, StudentId};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    age,
    birth_date,
    phone,
    tax_id
FROM students";

const DB_DATE_FORMAT: &str = "%Y-%m-%d";

pub type MirrorResult<T> = Result<T, MirrorError>;

/// Relational mirror failure.
#[derive(Debug)]
pub enum MirrorError {
    Db(DbError),
    NotFound(StudentId),
    InvalidData(String),
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found in mirror: {id}"),
            Self::InvalidData(message) => write!(f, "invalid mirrored student data: {message}"),
        }
    }
}

impl Error for MirrorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for MirrorError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for MirrorError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Secondary sink for student writes.
///
/// Callers treat every result as advisory; see `StudentRegistry`.
pub trait StudentMirror {
    fn create(&mut self, student: &Student) -> MirrorResult<()>;
    fn update(&mut self, student: &Student) -> MirrorResult<()>;
    fn delete(&mut self, id: &str) -> MirrorResult<()>;
    fn find(&self, id: &str) -> MirrorResult<Option<Student>>;
    fn list_all(&self) -> MirrorResult<Vec<Student>>;

    fn exists(&self, id: &str) -> MirrorResult<bool> {
        Ok(self.find(id)?.is_some())
    }
}

impl<M: StudentMirror + ?Sized> StudentMirror for Box<M> {
    fn create(&mut self, student: &Student) -> MirrorResult<()> {
        (**self).create(student)
    }

    fn update(&mut self, student: &Student) -> MirrorResult<()> {
        (**self).update(student)
    }

    fn delete(&mut self, id: &str) -> MirrorResult<()> {
        (**self).delete(id)
    }

    fn find(&self, id: &str) -> MirrorResult<Option<Student>> {
        (**self).find(id)
    }

    fn list_all(&self) -> MirrorResult<Vec<Student>> {
        (**self).list_all()
    }
}

/// SQLite-backed mirror owning its connection.
pub struct SqliteStudentMirror {
    conn: Connection,
}

impl SqliteStudentMirror {
    /// Wraps a connection already bootstrapped by `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Releases the owned connection.
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl StudentMirror for SqliteStudentMirror {
    fn create(&mut self, student: &Student) -> MirrorResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO students (
                id,
                name,
                age,
                birth_date,
                phone,
                tax_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                student.id.as_str(),
                student.name.as_str(),
                student.age,
                date_to_db(student.birth_date),
                student.phone.as_str(),
                student.tax_id.as_str(),
            ],
        )?;
        tx.commit()?;

        debug!("event=mirror_create module=mirror status=ok id={}", student.id);
        Ok(())
    }

    fn update(&mut self, student: &Student) -> MirrorResult<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE students
             SET
                name = ?1,
                age = ?2,
                birth_date = ?3,
                phone = ?4,
                tax_id = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                student.name.as_str(),
                student.age,
                date_to_db(student.birth_date),
                student.phone.as_str(),
                student.tax_id.as_str(),
                student.id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(MirrorError::NotFound(student.id.clone()));
        }
        tx.commit()?;

        debug!("event=mirror_update module=mirror status=ok id={}", student.id);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> MirrorResult<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute("DELETE FROM students WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(MirrorError::NotFound(id.to_string()));
        }
        tx.commit()?;

        debug!("event=mirror_delete module=mirror status=ok id={id}");
        Ok(())
    }

    fn find(&self, id: &str) -> MirrorResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_student_row(row)))
            .optional()?;
        row.transpose()
    }

    fn list_all(&self) -> MirrorResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }
}

/// Mirror used when the relational store is turned off or unavailable.
///
/// Writes succeed without effect and reads are always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMirror;

impl StudentMirror for DisabledMirror {
    fn create(&mut self, _student: &Student) -> MirrorResult<()> {
        Ok(())
    }

    fn update(&mut self, _student: &Student) -> MirrorResult<()> {
        Ok(())
    }

    fn delete(&mut self, _id: &str) -> MirrorResult<()> {
        Ok(())
    }

    fn find(&self, _id: &str) -> MirrorResult<Option<Student>> {
        Ok(None)
    }

    fn list_all(&self) -> MirrorResult<Vec<Student>> {
        Ok(Vec::new())
    }
}

fn parse_student_row(row: &Row<'_>) -> MirrorResult<Student> {
    let id: String = row.get("id")?;

    let birth_text: String = row.get("birth_date")?;
    let birth_date = NaiveDate::parse_from_str(&birth_text, DB_DATE_FORMAT).map_err(|_| {
        MirrorError::InvalidData(format!(
            "invalid birth date `{birth_text}` in students.birth_date for id `{id}`"
        ))
    })?;

    let age_value: i64 = row.get("age")?;
    let age = u32::try_from(age_value).map_err(|_| {
        MirrorError::InvalidData(format!(
            "invalid age `{age_value}` in students.age for id `{id}`"
        ))
    })?;

    Ok(Student {
        id,
        name: row.get("name")?,
        age,
        birth_date,
        phone: row.get("phone")?,
        tax_id: row.get("tax_id")?,
    })
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DB_DATE_FORMAT).to_string()
}
