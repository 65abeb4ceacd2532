//! Port traits: the storage seams of the graduation tracker.
//!
//! `gradtrack_postgres` implements these against a `PgPool`; [`crate::memory`]
//! implements them in-process. Services hold them as `Arc<dyn Trait>`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::GradError;
use crate::types::{
    ApprovalRecord, ApprovalUpdate, ChecklistItem, ChecklistItemUpdate, StudentOverview,
    UserCredentials,
};

pub type Result<T> = std::result::Result<T, GradError>;

/// Per-student document submissions joined against the document catalog.
#[async_trait]
pub trait ChecklistStore: Send + Sync {
    /// Every catalog entry joined with the student's submission, ordered by
    /// document name. Unknown students simply get an all-PENDING checklist.
    async fn get_checklist(&self, student_id: Uuid) -> Result<Vec<ChecklistItem>>;

    /// Upsert every item in one transaction, then return the full refreshed
    /// checklist. Any failing item rolls the whole batch back.
    async fn update_checklist(
        &self,
        student_id: Uuid,
        items: &[ChecklistItemUpdate],
    ) -> Result<Vec<ChecklistItem>>;
}

/// The single approval record per student.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    async fn find_approval(&self, student_id: Uuid) -> Result<Option<ApprovalRecord>>;

    /// Replace the student's approval record wholesale (insert on first write).
    async fn upsert_approval(
        &self,
        student_id: Uuid,
        update: &ApprovalUpdate,
    ) -> Result<ApprovalRecord>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn find_overview(&self, student_number: &str) -> Result<Option<StudentOverview>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserCredentials>>;
}
