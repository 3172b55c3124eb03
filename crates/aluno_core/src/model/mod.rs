//! Student domain model and input validation.
//!
//! # Responsibility
//! - Define the canonical student record used by the registry and stores.
//! - Validate raw presentation input before it becomes a record.
//!
//! # Invariants
//! - Student identity is the `id` field alone.

pub mod form;
pub mod student;
