//! RegistrarService, the domain service behind every HTTP route.
//!
//! Takes port traits via `Arc<dyn PortTrait>` so the same logic runs against
//! Postgres in production and the in-memory stores in tests. Inputs arrive
//! already validated; this layer only enforces cross-field rules and maps
//! absent rows to `NotFound`.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::GradError,
    ports::{ApprovalStore, ChecklistStore, StudentStore, UserStore},
    status::{ChecklistSummary, CompletionSummary},
    types::{
        AccountStatus, ApprovalRecord, ApprovalState, ApprovalUpdate, AuthUser, ChecklistItem,
        ChecklistItemUpdate, LoginInput, StudentOverview,
    },
};

pub type Result<T> = std::result::Result<T, GradError>;

// ── RegistrarService trait ────────────────────────────────────

#[async_trait]
pub trait RegistrarService: Send + Sync {
    /// Check credentials. `Ok(None)` covers unknown users, inactive accounts
    /// and wrong passwords alike.
    async fn authenticate(&self, input: &LoginInput) -> Result<Option<AuthUser>>;

    async fn current_user(&self, user_id: Uuid) -> Result<AuthUser>;

    async fn student_overview(&self, student_number: &str) -> Result<StudentOverview>;

    async fn checklist(&self, student_id: Uuid) -> Result<Vec<ChecklistItem>>;

    async fn update_checklist(
        &self,
        student_id: Uuid,
        items: Vec<ChecklistItemUpdate>,
    ) -> Result<Vec<ChecklistItem>>;

    /// Completion summary of the stored checklist plus its derived status.
    /// The approval record's `approvalStatus == APPROVED` is the approved flag.
    async fn checklist_summary(&self, student_id: Uuid) -> Result<ChecklistSummary>;

    async fn upsert_approval(
        &self,
        student_id: Uuid,
        update: ApprovalUpdate,
    ) -> Result<ApprovalRecord>;
}

// ── RegistrarServiceImpl ──────────────────────────────────────

pub struct RegistrarServiceImpl {
    pub checklists: Arc<dyn ChecklistStore>,
    pub approvals: Arc<dyn ApprovalStore>,
    pub students: Arc<dyn StudentStore>,
    pub users: Arc<dyn UserStore>,
}

impl RegistrarServiceImpl {
    pub fn new(
        checklists: Arc<dyn ChecklistStore>,
        approvals: Arc<dyn ApprovalStore>,
        students: Arc<dyn StudentStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            checklists,
            approvals,
            students,
            users,
        }
    }
}

#[async_trait]
impl RegistrarService for RegistrarServiceImpl {
    async fn authenticate(&self, input: &LoginInput) -> Result<Option<AuthUser>> {
        let Some(creds) = self.users.find_by_username(&input.username).await? else {
            tracing::debug!(username = %input.username, "login for unknown user");
            return Ok(None);
        };
        if creds.status != AccountStatus::Active {
            tracing::debug!(user_id = %creds.user_id, "login for inactive account");
            return Ok(None);
        }
        // bcrypt is CPU-bound; keep it off the async workers.
        let password = input.password.clone();
        let hash = creds.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| GradError::Storage(anyhow::anyhow!("password check aborted: {e}")))?;
        // A malformed stored hash is treated like a mismatch, not a 500.
        let matches = verified.unwrap_or_else(|e| {
            tracing::warn!(user_id = %creds.user_id, "unreadable password hash: {e}");
            false
        });
        if !matches {
            return Ok(None);
        }
        tracing::info!(user_id = %creds.user_id, role = %creds.role, "user authenticated");
        Ok(Some(creds.to_auth_user()))
    }

    async fn current_user(&self, user_id: Uuid) -> Result<AuthUser> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|creds| creds.to_auth_user())
            .ok_or_else(|| GradError::NotFound("User not found".into()))
    }

    async fn student_overview(&self, student_number: &str) -> Result<StudentOverview> {
        self.students
            .find_overview(student_number)
            .await?
            .ok_or_else(|| GradError::NotFound("Student not found".into()))
    }

    async fn checklist(&self, student_id: Uuid) -> Result<Vec<ChecklistItem>> {
        self.checklists.get_checklist(student_id).await
    }

    async fn update_checklist(
        &self,
        student_id: Uuid,
        items: Vec<ChecklistItemUpdate>,
    ) -> Result<Vec<ChecklistItem>> {
        if items.is_empty() {
            return Err(GradError::invalid(
                "items",
                "Array must contain at least 1 element(s)",
            ));
        }
        let updated = self.checklists.update_checklist(student_id, &items).await?;
        tracing::info!(
            %student_id,
            changed = items.len(),
            total = updated.len(),
            "checklist updated"
        );
        Ok(updated)
    }

    async fn checklist_summary(&self, student_id: Uuid) -> Result<ChecklistSummary> {
        let items = self.checklists.get_checklist(student_id).await?;
        let approved = self
            .approvals
            .find_approval(student_id)
            .await?
            .is_some_and(|rec| rec.approval_status == ApprovalState::Approved);
        Ok(ChecklistSummary::new(
            CompletionSummary::from_checklist(&items),
            approved,
        ))
    }

    async fn upsert_approval(
        &self,
        student_id: Uuid,
        update: ApprovalUpdate,
    ) -> Result<ApprovalRecord> {
        let record = self.approvals.upsert_approval(student_id, &update).await?;
        tracing::info!(
            %student_id,
            status = %record.approval_status,
            vpaa = record.vpaa_approved,
            final_ = record.final_approved,
            "approval status upserted"
        );
        Ok(record)
    }
}
