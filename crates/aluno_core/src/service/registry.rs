//! In-memory student registry.
//!
//! # Responsibility
//! - Own the authoritative ordered student sequence for the process.
//! - Enforce id uniqueness and insert-position bounds.
//! - Keep the flat-file store and the relational mirror in step with every
//!   mutation.
//!
//! # Invariants
//! - No two entries share an `id`.
//! - In-memory state is never rolled back because a persistence write failed.
//! - Flat-file and mirror failures are logged as warnings, never returned.
//! - Reordering (`sort_by`) is not written anywhere; the next mutation
//!   persists whatever order is current.

use crate::mirror::student_mirror::{MirrorResult, StudentMirror};
use crate::model::student::{ids_equal, Student, StudentId};
use crate::store::flat_file::FlatFileStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Position used by [`StudentRegistry::insert_third`].
const THIRD_POSITION: usize = 2;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Domain-rule violation that aborts a registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A student with this id is already registered.
    DuplicateKey(StudentId),
    /// Insert position outside `0..=len`.
    OutOfRange { position: usize, len: usize },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey(id) => write!(f, "a student with id `{id}` already exists"),
            Self::OutOfRange { position, len } => write!(
                f,
                "invalid position {position}; the registry has {len} students"
            ),
        }
    }
}

impl Error for RegistryError {}

/// Ascending sort criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Id,
    Age,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "id" => Ok(Self::Id),
            "age" => Ok(Self::Age),
            other => Err(format!("unsupported sort key `{other}`; expected name|id|age")),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Name => "name",
            Self::Id => "id",
            Self::Age => "age",
        };
        f.write_str(label)
    }
}

/// Youngest and oldest students; both `None` for an empty registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeExtremes<'a> {
    pub youngest: Option<&'a Student>,
    pub oldest: Option<&'a Student>,
}

/// Authoritative student sequence plus its two persistence collaborators.
pub struct StudentRegistry<M: StudentMirror> {
    students: Vec<Student>,
    store: FlatFileStore,
    mirror: M,
}

impl<M: StudentMirror> StudentRegistry<M> {
    /// Builds a registry seeded from the flat file.
    ///
    /// A missing file starts an empty registry. An unreadable file is logged
    /// and also starts empty.
    pub fn open(store: FlatFileStore, mirror: M) -> Self {
        let students = match store.load() {
            Ok(students) => students,
            Err(err) => {
                warn!(
                    "event=registry_open module=registry status=degraded path={} error={}",
                    store.path().display(),
                    err
                );
                Vec::new()
            }
        };
        Self::with_students(students, store, mirror)
    }

    /// Builds a registry from an already-loaded sequence without touching
    /// either collaborator.
    pub fn with_students(students: Vec<Student>, store: FlatFileStore, mirror: M) -> Self {
        info!(
            "event=registry_open module=registry status=ok count={}",
            students.len()
        );
        Self {
            students,
            store,
            mirror,
        }
    }

    /// Snapshot of the current order.
    pub fn list(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.students.iter().any(|student| student.has_id(id))
    }

    pub fn store(&self) -> &FlatFileStore {
        &self.store
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Appends a new student.
    ///
    /// # Errors
    /// - [`RegistryError::DuplicateKey`] when the id is already registered.
    pub fn add(&mut self, student: Student) -> RegistryResult<()> {
        self.ensure_unique("add", &student)?;

        let result = self.mirror.create(&student);
        log_mirror_outcome("create", &student.id, result);

        info!(
            "event=student_add module=registry status=ok id={} count={}",
            student.id,
            self.students.len() + 1
        );
        self.students.push(student);
        self.persist();
        Ok(())
    }

    /// Splices a new student in at `position`, shifting later entries right.
    ///
    /// # Errors
    /// - [`RegistryError::DuplicateKey`] when the id is already registered
    ///   (checked before the position).
    /// - [`RegistryError::OutOfRange`] when `position > len`.
    pub fn insert_at(&mut self, student: Student, position: usize) -> RegistryResult<()> {
        self.ensure_unique("insert", &student)?;

        let len = self.students.len();
        if position > len {
            return Err(RegistryError::OutOfRange { position, len });
        }

        let result = self.mirror.create(&student);
        log_mirror_outcome("create", &student.id, result);

        info!(
            "event=student_insert module=registry status=ok id={} position={} count={}",
            student.id,
            position,
            len + 1
        );
        self.students.insert(position, student);
        self.persist();
        Ok(())
    }

    /// Inserts at the third slot, or appends when fewer than two students
    /// are registered.
    pub fn insert_third(&mut self, student: Student) -> RegistryResult<()> {
        match self.insert_at(student.clone(), THIRD_POSITION) {
            Err(RegistryError::OutOfRange { .. }) => {
                info!(
                    "event=student_insert module=registry status=fallback id={} reason=short_list",
                    student.id
                );
                self.add(student)
            }
            other => other,
        }
    }

    /// Returns the first student with `id`, logging the current count.
    pub fn find_by_id(&self, id: &str) -> Option<&Student> {
        let found = self.students.iter().find(|student| student.has_id(id));
        info!(
            "event=student_find module=registry status=ok id={} found={} count={}",
            id,
            found.is_some(),
            self.students.len()
        );
        found
    }

    /// Removes the student with `id`.
    ///
    /// Returns the removed record, or `None` when no student matched; in
    /// that case nothing is written.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Student> {
        let target = self.find_by_id(id)?.clone();
        let index = self
            .students
            .iter()
            .position(|student| ids_equal(student, &target))?;
        let removed = self.students.remove(index);

        let result = self.mirror.delete(&removed.id);
        log_mirror_outcome("delete", &removed.id, result);

        info!(
            "event=student_remove module=registry status=ok id={} count={}",
            removed.id,
            self.students.len()
        );
        self.persist();
        Some(removed)
    }

    /// Replaces the entry with the same id in place.
    ///
    /// Returns `false` without any mutation when the id is not registered.
    pub fn update(&mut self, student: Student) -> bool {
        let Some(index) = self
            .students
            .iter()
            .position(|existing| ids_equal(existing, &student))
        else {
            info!(
                "event=student_update module=registry status=not_found id={}",
                student.id
            );
            return false;
        };

        let result = self.mirror.update(&student);
        log_mirror_outcome("update", &student.id, result);

        info!(
            "event=student_update module=registry status=ok id={} position={}",
            student.id, index
        );
        self.students[index] = student;
        self.persist();
        true
    }

    /// Stable ascending sort of the canonical order.
    pub fn sort_by(&mut self, key: SortKey) {
        match key {
            SortKey::Name => self.students.sort_by(|a, b| a.name.cmp(&b.name)),
            SortKey::Id => self.students.sort_by(|a, b| a.id.cmp(&b.id)),
            SortKey::Age => self.students.sort_by_key(|student| student.age),
        }
        info!(
            "event=student_sort module=registry status=ok key={} count={}",
            key,
            self.students.len()
        );
    }

    /// Youngest and oldest students in one pass; ties keep the earliest.
    pub fn extremes(&self) -> AgeExtremes<'_> {
        let mut iter = self.students.iter();
        let Some(first) = iter.next() else {
            info!("event=student_extremes module=registry status=ok count=0");
            return AgeExtremes {
                youngest: None,
                oldest: None,
            };
        };

        let (youngest, oldest) = iter.fold((first, first), |(youngest, oldest), student| {
            (
                if student.age < youngest.age {
                    student
                } else {
                    youngest
                },
                if student.age > oldest.age {
                    student
                } else {
                    oldest
                },
            )
        });

        info!(
            "event=student_extremes module=registry status=ok youngest_id={} youngest_age={} oldest_id={} oldest_age={}",
            youngest.id, youngest.age, oldest.id, oldest.age
        );
        AgeExtremes {
            youngest: Some(youngest),
            oldest: Some(oldest),
        }
    }

    /// Drops every student and rewrites the flat file empty.
    ///
    /// The mirror is left untouched.
    pub fn clear(&mut self) {
        self.students.clear();
        info!("event=student_clear module=registry status=ok");
        self.persist();
    }

    /// `operation` names the `event=student_<operation>` the rejection is
    /// logged under.
    fn ensure_unique(&self, operation: &'static str, student: &Student) -> RegistryResult<()> {
        if self
            .students
            .iter()
            .any(|existing| ids_equal(existing, student))
        {
            warn!("{}", duplicate_rejection_message(operation, &student.id));
            return Err(RegistryError::DuplicateKey(student.id.clone()));
        }
        Ok(())
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.students) {
            warn!(
                "event=flat_save module=registry status=error path={} error={}",
                self.store.path().display(),
                err
            );
        }
    }
}

fn duplicate_rejection_message(operation: &str, id: &str) -> String {
    format!(
        "event=student_{operation} module=registry status=rejected error_code=duplicate_key id={id}"
    )
}

fn log_mirror_outcome(operation: &'static str, id: &str, result: MirrorResult<()>) {
    if let Err(err) = result {
        warn!(
            "event=mirror_{} module=registry status=error id={} error={}",
            operation, id, err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::duplicate_rejection_message;

    #[test]
    fn duplicate_rejection_is_logged_under_the_calling_operation() {
        let message = duplicate_rejection_message("insert", "7");
        assert!(message.starts_with("event=student_insert "));
        assert!(message.ends_with("error_code=duplicate_key id=7"));
        assert!(duplicate_rejection_message("add", "7").starts_with("event=student_add "));
    }
}
