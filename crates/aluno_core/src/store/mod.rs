//! Authoritative on-disk persistence for the student sequence.
//!
//! # See also
//! - `service::registry` for the single writer of this store.

pub mod flat_file;
