//! Core domain types for the graduation tracker.
//! These are pure value types with no database dependencies.
//! Wire shape is camelCase JSON throughout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ── Enums ─────────────────────────────────────────────────────

/// Submission status of one document for one student.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        Self::Pending,
        Self::Submitted,
        Self::Approved,
        Self::Rejected,
    ];

    /// `submitted_at` is stamped when a document enters any of these states.
    pub fn stamps_submitted(self) -> bool {
        matches!(self, Self::Submitted | Self::Approved | Self::Rejected)
    }

    /// `verified_at` is stamped once the registrar has ruled on the document.
    pub fn stamps_verified(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Server-side completion signal; anything past PENDING counts as done.
    pub fn is_complete(self) -> bool {
        self != Self::Pending
    }
}

/// Overall approval state of a student's graduation application.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalState {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalState {
    pub const ALL: [ApprovalState; 3] = [Self::Pending, Self::Approved, Self::Rejected];
}

/// Login account lifecycle. Only active accounts may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
}

// ── Checklist ────────────────────────────────────────────────

/// Catalog entry for a document a graduating student must provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_required: bool,
}

/// One row of a student's checklist: a catalog entry joined with the
/// student's submission for it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub document_type_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_required: bool,
    pub status: DocumentStatus,
    pub student_document_id: Option<Uuid>,
    pub file_url: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl ChecklistItem {
    /// Checklist row for a catalog entry the student has not touched yet.
    pub fn unsubmitted(doc: &DocumentType) -> Self {
        Self {
            document_type_id: doc.id,
            code: doc.code.clone(),
            name: doc.name.clone(),
            description: doc.description.clone(),
            is_required: doc.is_required,
            status: DocumentStatus::Pending,
            student_document_id: None,
            file_url: None,
            submitted_at: None,
            verified_at: None,
            remarks: None,
        }
    }
}

/// A requested status change for one checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemUpdate {
    pub document_type_id: Uuid,
    pub status: DocumentStatus,
    pub remarks: Option<String>,
}

// ── Approval ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalUpdate {
    pub approval_status: ApprovalState,
    pub vpaa_approved: bool,
    pub final_approved: bool,
    pub remarks: Option<String>,
}

/// The single approval record held per student.
/// Invariant: each `*_at` timestamp is set iff its flag is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    pub approval_id: Uuid,
    pub student_id: Uuid,
    pub approval_status: ApprovalState,
    pub vpaa_approved: bool,
    pub final_approved: bool,
    pub vpaa_approved_at: Option<DateTime<Utc>>,
    pub final_approved_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl ApprovalRecord {
    /// Build the record an upsert writes. Every field is replaced, so prior
    /// timestamps never survive.
    pub fn from_update(
        approval_id: Uuid,
        student_id: Uuid,
        update: &ApprovalUpdate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            approval_id,
            student_id,
            approval_status: update.approval_status,
            vpaa_approved: update.vpaa_approved,
            final_approved: update.final_approved,
            vpaa_approved_at: update.vpaa_approved.then_some(now),
            final_approved_at: update.final_approved.then_some(now),
            remarks: update.remarks.clone(),
        }
    }
}

// ── Students ─────────────────────────────────────────────────

/// Student, program, approval and award summary used by the registrar lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverview {
    pub student_id: Uuid,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub enrollment_date: Option<NaiveDate>,
    pub program_name: Option<String>,
    pub department_name: Option<String>,
    pub approval_status: Option<ApprovalState>,
    pub vpaa_approved: Option<bool>,
    pub final_approved: Option<bool>,
    pub remarks: Option<String>,
    pub awards: Vec<String>,
}

// ── Accounts ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

/// Stored credentials. Never serialized onto the wire.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub status: AccountStatus,
}

impl UserCredentials {
    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            user_id: self.user_id,
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}
