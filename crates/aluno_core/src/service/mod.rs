//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate flat-file and mirror calls behind registry operations.
//! - Keep presentation layers decoupled from storage details.

pub mod registry;
