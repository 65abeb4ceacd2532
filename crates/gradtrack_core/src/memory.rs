//! In-process implementations of every port trait.
//!
//! Used as the test double for the service and HTTP layers. Semantics follow
//! the Postgres adapter: checklist updates are all-or-nothing, unknown
//! document types fail like a foreign-key violation, and the checklist is
//! ordered by document name.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::GradError;
use crate::ports::{ApprovalStore, ChecklistStore, Result, StudentStore, UserStore};
use crate::types::{
    AccountStatus, ApprovalRecord, ApprovalUpdate, ChecklistItem, ChecklistItemUpdate,
    DocumentStatus, DocumentType, StudentOverview, UserCredentials,
};

/// Student data the in-memory student store serves overviews from.
#[derive(Debug, Clone, Default)]
pub struct StudentProfile {
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub enrollment_date: Option<NaiveDate>,
    pub program_name: Option<String>,
    pub department_name: Option<String>,
    pub awards: Vec<String>,
}

#[derive(Debug, Clone)]
struct Submission {
    id: Uuid,
    status: DocumentStatus,
    file_url: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    verified_at: Option<DateTime<Utc>>,
    remarks: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    document_types: Vec<DocumentType>,
    submissions: HashMap<(Uuid, Uuid), Submission>,
    approvals: HashMap<Uuid, ApprovalRecord>,
    students: HashMap<Uuid, StudentProfile>,
    users: Vec<UserCredentials>,
}

impl MemoryState {
    fn checklist(&self, student_id: Uuid) -> Vec<ChecklistItem> {
        let mut catalog: Vec<&DocumentType> = self.document_types.iter().collect();
        catalog.sort_by(|a, b| a.name.cmp(&b.name));
        catalog
            .into_iter()
            .map(|doc| {
                let base = ChecklistItem::unsubmitted(doc);
                match self.submissions.get(&(student_id, doc.id)) {
                    Some(sub) => ChecklistItem {
                        status: sub.status,
                        student_document_id: Some(sub.id),
                        file_url: sub.file_url.clone(),
                        submitted_at: sub.submitted_at,
                        verified_at: sub.verified_at,
                        remarks: sub.remarks.clone(),
                        ..base
                    },
                    None => base,
                }
            })
            .collect()
    }
}

/// Shared in-memory store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStores {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_document_type(&self, code: &str, name: &str, is_required: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.state().document_types.push(DocumentType {
            id,
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            is_required,
        });
        id
    }

    pub fn add_student(&self, profile: StudentProfile) -> Uuid {
        let id = Uuid::new_v4();
        self.state().students.insert(id, profile);
        id
    }

    pub fn add_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
        status: AccountStatus,
    ) -> Uuid {
        let user_id = Uuid::new_v4();
        self.state().users.push(UserCredentials {
            user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            status,
        });
        user_id
    }
}

#[async_trait]
impl ChecklistStore for MemoryStores {
    async fn get_checklist(&self, student_id: Uuid) -> Result<Vec<ChecklistItem>> {
        Ok(self.state().checklist(student_id))
    }

    async fn update_checklist(
        &self,
        student_id: Uuid,
        items: &[ChecklistItemUpdate],
    ) -> Result<Vec<ChecklistItem>> {
        let mut state = self.state();

        // Check the whole batch before writing so a failure leaves no trace.
        if let Some(missing) = items
            .iter()
            .find(|item| !state.document_types.iter().any(|d| d.id == item.document_type_id))
        {
            return Err(GradError::Storage(anyhow!(
                "document type {} does not exist",
                missing.document_type_id
            )));
        }

        let now = Utc::now();
        for item in items {
            let key = (student_id, item.document_type_id);
            let id = state.submissions.get(&key).map(|s| s.id);
            let file_url = state.submissions.get(&key).and_then(|s| s.file_url.clone());
            state.submissions.insert(
                key,
                Submission {
                    id: id.unwrap_or_else(Uuid::new_v4),
                    status: item.status,
                    file_url,
                    submitted_at: item.status.stamps_submitted().then_some(now),
                    verified_at: item.status.stamps_verified().then_some(now),
                    remarks: item.remarks.clone(),
                },
            );
        }

        Ok(state.checklist(student_id))
    }
}

#[async_trait]
impl ApprovalStore for MemoryStores {
    async fn find_approval(&self, student_id: Uuid) -> Result<Option<ApprovalRecord>> {
        Ok(self.state().approvals.get(&student_id).cloned())
    }

    async fn upsert_approval(
        &self,
        student_id: Uuid,
        update: &ApprovalUpdate,
    ) -> Result<ApprovalRecord> {
        let mut state = self.state();
        let approval_id = state
            .approvals
            .get(&student_id)
            .map(|rec| rec.approval_id)
            .unwrap_or_else(Uuid::new_v4);
        let record = ApprovalRecord::from_update(approval_id, student_id, update, Utc::now());
        state.approvals.insert(student_id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl StudentStore for MemoryStores {
    async fn find_overview(&self, student_number: &str) -> Result<Option<StudentOverview>> {
        let state = self.state();
        let Some((student_id, profile)) = state
            .students
            .iter()
            .find(|(_, p)| p.student_number == student_number)
        else {
            return Ok(None);
        };
        let approval = state.approvals.get(student_id);
        let mut awards = profile.awards.clone();
        awards.sort();
        awards.dedup();
        Ok(Some(StudentOverview {
            student_id: *student_id,
            student_number: profile.student_number.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            enrollment_date: profile.enrollment_date,
            program_name: profile.program_name.clone(),
            department_name: profile.department_name.clone(),
            approval_status: approval.map(|a| a.approval_status),
            vpaa_approved: approval.map(|a| a.vpaa_approved),
            final_approved: approval.map(|a| a.final_approved),
            remarks: approval.and_then(|a| a.remarks.clone()),
            awards,
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStores {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserCredentials>> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }
}
