//! Best-effort relational copy of the student registry.
//!
//! # Invariants
//! - Mirror results are advisory; the registry logs and discards them.

pub mod student_mirror;
