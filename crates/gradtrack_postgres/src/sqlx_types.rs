//! Row structs for runtime-checked `sqlx::query_as` calls.
//!
//! Enum columns are selected as `::text` and parsed here, so every
//! conversion into a core type is fallible with a `String` error.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use gradtrack_core::types::{
    AccountStatus, ApprovalRecord, ApprovalState, ChecklistItem, DocumentStatus, StudentOverview,
    UserCredentials,
};

fn parse_enum<T: std::str::FromStr>(column: &str, raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("unexpected {column} value '{raw}'"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgChecklistRow {
    pub document_type_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_required: bool,
    pub student_document_id: Option<Uuid>,
    pub status: String,
    pub file_url: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl TryFrom<PgChecklistRow> for ChecklistItem {
    type Error = String;

    fn try_from(r: PgChecklistRow) -> Result<Self, Self::Error> {
        Ok(ChecklistItem {
            status: parse_enum::<DocumentStatus>("status", &r.status)?,
            document_type_id: r.document_type_id,
            code: r.code,
            name: r.name,
            description: r.description,
            is_required: r.is_required,
            student_document_id: r.student_document_id,
            file_url: r.file_url,
            submitted_at: r.submitted_at,
            verified_at: r.verified_at,
            remarks: r.remarks,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgApprovalRow {
    pub approval_id: Uuid,
    pub student_id: Uuid,
    pub approval_status: String,
    pub vpaa_approved: bool,
    pub final_approved: bool,
    pub vpaa_approved_at: Option<DateTime<Utc>>,
    pub final_approved_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl TryFrom<PgApprovalRow> for ApprovalRecord {
    type Error = String;

    fn try_from(r: PgApprovalRow) -> Result<Self, Self::Error> {
        Ok(ApprovalRecord {
            approval_status: parse_enum::<ApprovalState>("approval_status", &r.approval_status)?,
            approval_id: r.approval_id,
            student_id: r.student_id,
            vpaa_approved: r.vpaa_approved,
            final_approved: r.final_approved,
            vpaa_approved_at: r.vpaa_approved_at,
            final_approved_at: r.final_approved_at,
            remarks: r.remarks,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgOverviewRow {
    pub student_id: Uuid,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub enrollment_date: Option<NaiveDate>,
    pub program_name: Option<String>,
    pub department_name: Option<String>,
    pub approval_status: Option<String>,
    pub vpaa_approved: Option<bool>,
    pub final_approved: Option<bool>,
    pub remarks: Option<String>,
    pub awards: Vec<String>,
}

impl TryFrom<PgOverviewRow> for StudentOverview {
    type Error = String;

    fn try_from(r: PgOverviewRow) -> Result<Self, Self::Error> {
        let approval_status = r
            .approval_status
            .as_deref()
            .map(|s| parse_enum::<ApprovalState>("approval_status", s))
            .transpose()?;
        Ok(StudentOverview {
            student_id: r.student_id,
            student_number: r.student_number,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            enrollment_date: r.enrollment_date,
            program_name: r.program_name,
            department_name: r.department_name,
            approval_status,
            vpaa_approved: r.vpaa_approved,
            final_approved: r.final_approved,
            remarks: r.remarks,
            awards: r.awards,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgUserRow {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
}

impl TryFrom<PgUserRow> for UserCredentials {
    type Error = String;

    fn try_from(r: PgUserRow) -> Result<Self, Self::Error> {
        Ok(UserCredentials {
            status: parse_enum::<AccountStatus>("status", &r.status)?,
            user_id: r.user_id,
            username: r.username,
            password_hash: r.password_hash,
            role: r.role,
        })
    }
}
