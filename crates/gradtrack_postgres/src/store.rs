//! Postgres implementations of the gradtrack_core port traits.
//!
//! Each adapter is a newtype wrapping PgPool. All SQL is runtime-checked
//! (sqlx::query, not sqlx::query!) so builds never need a live database.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gradtrack_core::error::GradError;
use gradtrack_core::ports::{ApprovalStore, ChecklistStore, Result, StudentStore, UserStore};
use gradtrack_core::types::{
    ApprovalRecord, ApprovalUpdate, ChecklistItem, ChecklistItemUpdate, StudentOverview,
    UserCredentials,
};

use crate::sqlx_types::{PgApprovalRow, PgChecklistRow, PgOverviewRow, PgUserRow};

fn row_error(e: String) -> GradError {
    GradError::Storage(anyhow!(e))
}

// ── PgChecklistStore ──────────────────────────────────────────

pub struct PgChecklistStore {
    pool: PgPool,
}

impl PgChecklistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_checklist(&self, student_id: Uuid) -> Result<Vec<ChecklistItem>> {
        let rows = sqlx::query_as::<_, PgChecklistRow>(
            r#"
            SELECT dt.document_type_id, dt.code, dt.name, dt.description, dt.is_required,
                   sd.student_document_id,
                   COALESCE(sd.status::text, 'PENDING') AS status,
                   sd.file_url, sd.submitted_at, sd.verified_at, sd.remarks
            FROM document_type dt
            LEFT JOIN student_document sd
              ON sd.document_type_id = dt.document_type_id
             AND sd.student_id = $1
            ORDER BY dt.name
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        rows.into_iter()
            .map(|r| ChecklistItem::try_from(r).map_err(row_error))
            .collect()
    }
}

#[async_trait]
impl ChecklistStore for PgChecklistStore {
    async fn get_checklist(&self, student_id: Uuid) -> Result<Vec<ChecklistItem>> {
        self.fetch_checklist(student_id).await
    }

    async fn update_checklist(
        &self,
        student_id: Uuid,
        items: &[ChecklistItemUpdate],
    ) -> Result<Vec<ChecklistItem>> {
        let mut tx = self.pool.begin().await.map_err(|e| anyhow!(e))?;

        for item in items {
            // Timestamps follow the new status on insert and on conflict alike.
            sqlx::query(
                r#"
                INSERT INTO student_document (
                    student_id, document_type_id, status, remarks, submitted_at, verified_at
                )
                VALUES (
                    $1, $2, $3::document_status_enum, $4,
                    CASE WHEN $5 THEN NOW() ELSE NULL END,
                    CASE WHEN $6 THEN NOW() ELSE NULL END
                )
                ON CONFLICT (student_id, document_type_id)
                DO UPDATE SET
                    status = EXCLUDED.status,
                    remarks = EXCLUDED.remarks,
                    submitted_at = EXCLUDED.submitted_at,
                    verified_at = EXCLUDED.verified_at,
                    updated_at = NOW()
                "#,
            )
            .bind(student_id)
            .bind(item.document_type_id)
            .bind(item.status.as_ref())
            .bind(item.remarks.as_deref())
            .bind(item.status.stamps_submitted())
            .bind(item.status.stamps_verified())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::warn!(
                    %student_id,
                    document_type_id = %item.document_type_id,
                    "checklist upsert failed, rolling back: {e}"
                );
                anyhow!(e)
            })?;
        }

        tx.commit().await.map_err(|e| anyhow!(e))?;

        self.fetch_checklist(student_id).await
    }
}

// ── PgApprovalStore ───────────────────────────────────────────

pub struct PgApprovalStore {
    pool: PgPool,
}

impl PgApprovalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApprovalStore for PgApprovalStore {
    async fn find_approval(&self, student_id: Uuid) -> Result<Option<ApprovalRecord>> {
        let row = sqlx::query_as::<_, PgApprovalRow>(
            r#"
            SELECT approval_id, student_id, approval_status::text AS approval_status,
                   vpaa_approved, final_approved, vpaa_approved_at, final_approved_at, remarks
            FROM approval_status
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        row.map(|r| ApprovalRecord::try_from(r).map_err(row_error))
            .transpose()
    }

    async fn upsert_approval(
        &self,
        student_id: Uuid,
        update: &ApprovalUpdate,
    ) -> Result<ApprovalRecord> {
        let row = sqlx::query_as::<_, PgApprovalRow>(
            r#"
            INSERT INTO approval_status (
                student_id, approval_status, vpaa_approved, final_approved,
                vpaa_approved_at, final_approved_at, remarks
            )
            VALUES (
                $1, $2::approval_status_enum, $3, $4,
                CASE WHEN $3 THEN NOW() ELSE NULL END,
                CASE WHEN $4 THEN NOW() ELSE NULL END,
                $5
            )
            ON CONFLICT (student_id)
            DO UPDATE SET
                approval_status = EXCLUDED.approval_status,
                vpaa_approved = EXCLUDED.vpaa_approved,
                final_approved = EXCLUDED.final_approved,
                vpaa_approved_at = EXCLUDED.vpaa_approved_at,
                final_approved_at = EXCLUDED.final_approved_at,
                remarks = EXCLUDED.remarks,
                updated_at = NOW()
            RETURNING approval_id, student_id, approval_status::text AS approval_status,
                      vpaa_approved, final_approved, vpaa_approved_at, final_approved_at, remarks
            "#,
        )
        .bind(student_id)
        .bind(update.approval_status.as_ref())
        .bind(update.vpaa_approved)
        .bind(update.final_approved)
        .bind(update.remarks.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        ApprovalRecord::try_from(row).map_err(row_error)
    }
}

// ── PgStudentStore ────────────────────────────────────────────

pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn find_overview(&self, student_number: &str) -> Result<Option<StudentOverview>> {
        let row = sqlx::query_as::<_, PgOverviewRow>(
            r#"
            SELECT s.student_id, s.student_number::text AS student_number,
                   s.first_name, s.last_name, s.email, s.enrollment_date,
                   p.program_name, d.department_name,
                   a.approval_status::text AS approval_status,
                   a.vpaa_approved, a.final_approved, a.remarks,
                   ARRAY_REMOVE(ARRAY_AGG(DISTINCT aw.award_name), NULL)::text[] AS awards
            FROM student s
            LEFT JOIN program p ON p.program_id = s.program_id
            LEFT JOIN department d ON d.department_id = p.department_id
            LEFT JOIN approval_status a ON a.student_id = s.student_id
            LEFT JOIN student_award sa ON sa.student_id = s.student_id
            LEFT JOIN award aw ON aw.award_id = sa.award_id
            WHERE s.student_number = $1
            GROUP BY s.student_id, s.student_number, s.first_name, s.last_name, s.email,
                     s.enrollment_date, p.program_name, d.department_name,
                     a.approval_status, a.vpaa_approved, a.final_approved, a.remarks
            "#,
        )
        .bind(student_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        row.map(|r| StudentOverview::try_from(r).map_err(row_error))
            .transpose()
    }
}

// ── PgUserStore ───────────────────────────────────────────────

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, PgUserRow>(
            r#"
            SELECT user_id, username, password_hash, role, status
            FROM user_account
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        row.map(|r| UserCredentials::try_from(r).map_err(row_error))
            .transpose()
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, PgUserRow>(
            r#"
            SELECT user_id, username, password_hash, role, status
            FROM user_account
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        row.map(|r| UserCredentials::try_from(r).map_err(row_error))
            .transpose()
    }
}
