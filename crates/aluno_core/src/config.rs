//! Application configuration.
//!
//! # Responsibility
//! - Name the flat file, relational database and log settings in one place.
//! - Build the registry collaborators those settings describe.
//!
//! # Invariants
//! - A failing relational store degrades to [`DisabledMirror`]; it never
//!   prevents the registry from opening.

use crate::db::open_db;
use crate::logging::default_log_level;
use crate::mirror::student_mirror::{DisabledMirror, SqliteStudentMirror, StudentMirror};
use crate::service::registry::StudentRegistry;
use crate::store::flat_file::FlatFileStore;
use log::{info, warn};
use serde::Deserialize;
use std::path::PathBuf;

/// Default flat snapshot file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "ListagemAlunos.txt";
/// Default SQLite mirror database, relative to the working directory.
pub const DEFAULT_DATABASE_FILE: &str = "data/alunos.sqlite3";

/// Runtime settings for a registry session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Flat snapshot file path.
    pub data_file: PathBuf,
    /// SQLite mirror path. `None` disables the mirror.
    pub database: Option<PathBuf>,
    /// `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling logs. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            database: Some(PathBuf::from(DEFAULT_DATABASE_FILE)),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Opens the mirror described by `database`.
    ///
    /// Falls back to [`DisabledMirror`] when the mirror is off or the
    /// database cannot be opened.
    pub fn open_mirror(&self) -> Box<dyn StudentMirror> {
        let Some(path) = self.database.as_ref() else {
            info!("event=mirror_open module=config status=disabled");
            return Box::new(DisabledMirror);
        };

        match open_db(path) {
            Ok(conn) => Box::new(SqliteStudentMirror::new(conn)),
            Err(err) => {
                warn!(
                    "event=mirror_open module=config status=degraded path={} error={}",
                    path.display(),
                    err
                );
                Box::new(DisabledMirror)
            }
        }
    }

    /// Opens a registry over the configured flat file and mirror.
    pub fn open_registry(&self) -> StudentRegistry<Box<dyn StudentMirror>> {
        StudentRegistry::open(FlatFileStore::new(&self.data_file), self.open_mirror())
    }
}
