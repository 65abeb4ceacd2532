//! Graduation tracker PostgreSQL adapter.
//!
//! Implements the `gradtrack_core` port traits against a `PgPool`.

pub mod sqlx_types;
pub mod store;

use sqlx::PgPool;

pub use store::{PgApprovalStore, PgChecklistStore, PgStudentStore, PgUserStore};

/// Embedded schema migrations, applied at server startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// All Postgres port implementations sharing one pool.
pub struct PgStores {
    pub checklists: PgChecklistStore,
    pub approvals: PgApprovalStore,
    pub students: PgStudentStore,
    pub users: PgUserStore,
}

impl PgStores {
    pub fn new(pool: PgPool) -> Self {
        Self {
            checklists: PgChecklistStore::new(pool.clone()),
            approvals: PgApprovalStore::new(pool.clone()),
            students: PgStudentStore::new(pool.clone()),
            users: PgUserStore::new(pool),
        }
    }
}
