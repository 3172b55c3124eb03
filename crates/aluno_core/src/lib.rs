//! Core domain logic for the student registry.
//! This crate is the single source of truth for registry invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod mirror;
pub mod model;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use mirror::student_mirror::{
    DisabledMirror, MirrorError, MirrorResult, SqliteStudentMirror, StudentMirror,
};
pub use model::form::{normalize_tax_id, FormError, StudentForm};
pub use model::student::{
    age_on, calendar_age_on, ids_equal, parse_birth_date, FlatRecordError, Student, StudentId,
};
pub use service::registry::{
    AgeExtremes, RegistryError, RegistryResult, SortKey, StudentRegistry,
};
pub use store::flat_file::{FlatFileStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
