//! Graduation tracker core: pure domain types, port traits, and the
//! checklist status rules shared by the server and the client adapter.
//!
//! Nothing in this crate talks to a database directly. Storage lives behind
//! the traits in [`ports`]; `gradtrack_postgres` implements them with sqlx and
//! [`memory`] implements them in-process for tests.

pub mod error;
pub mod memory;
pub mod ports;
pub mod principal;
pub mod progress;
pub mod service;
pub mod status;
pub mod types;
pub mod validate;

pub use error::{FieldIssue, GradError};
pub use status::{derive_status, ChecklistStatus, CompletionSummary};
