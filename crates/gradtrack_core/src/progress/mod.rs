//! Client-side checklist progress.
//!
//! A local observable cache of per-student checklist progress, keyed by
//! student slug, plus the board and editor views that read and write it.

pub mod board;
pub mod catalog;
pub mod editor;
pub mod roster;
pub mod storage;
pub mod store;

pub use board::ChecklistBoard;
pub use editor::{ChecklistEditor, ProgressError};
pub use roster::{slugify, Requirement, Roster, RosterStudent, StudentDetail};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{
    parse_progress, ProgressChange, ProgressEntry, ProgressMap, ProgressStore, SubscriptionId,
    STORAGE_KEY,
};
