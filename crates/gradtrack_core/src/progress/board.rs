//! Roster board: one row per student with progress merged in from the store.
//!
//! The board subscribes on attach and recomputes every row on each change
//! notification, so rows always reflect the latest persisted progress.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::catalog;
use super::roster::{Roster, RosterStudent};
use super::store::{ProgressStore, SubscriptionId};
use crate::status::{ChecklistStatus, CompletionSummary};

pub struct ChecklistBoard {
    store: Arc<ProgressStore>,
    roster: Arc<Roster>,
    rows: Mutex<Vec<RosterStudent>>,
    subscription: SubscriptionId,
}

impl std::fmt::Debug for ChecklistBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecklistBoard")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

impl ChecklistBoard {
    /// Build the board and subscribe it to `store`. Dropping the returned
    /// handle unsubscribes.
    pub fn attach(store: Arc<ProgressStore>, roster: Arc<Roster>) -> Arc<Self> {
        let board = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let subscription = store.subscribe(move |_| {
                if let Some(board) = weak.upgrade() {
                    board.refresh();
                }
            });
            Self {
                store: Arc::clone(&store),
                roster,
                rows: Mutex::new(Vec::new()),
                subscription,
            }
        });
        board.refresh();
        board
    }

    /// Recompute every row from the roster baseline and the store.
    pub fn refresh(&self) {
        let rows: Vec<_> = self
            .roster
            .students
            .iter()
            .map(|student| self.compute_row(student))
            .collect();
        *self.rows.lock().unwrap_or_else(PoisonError::into_inner) = rows;
    }

    fn compute_row(&self, student: &RosterStudent) -> RosterStudent {
        let baseline_approved = student.status == ChecklistStatus::Approved;
        let approved = self.store.approval_for(&student.slug, baseline_approved);
        let summary = match self.roster.detail(&student.slug) {
            Some(detail) => CompletionSummary::from_flags(
                self.store
                    .requirements_for(&student.slug, &detail.requirements)
                    .iter()
                    .map(|r| r.complete),
            ),
            None => CompletionSummary::new(
                student.completed_requirements,
                student.total_requirements,
            ),
        };
        RosterStudent {
            completed_requirements: summary.completed_requirements,
            total_requirements: summary.total_requirements,
            status: summary.status(approved),
            ..student.clone()
        }
    }

    pub fn rows(&self) -> Vec<RosterStudent> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn row(&self, slug: &str) -> Option<RosterStudent> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.slug == slug)
            .cloned()
    }

    /// Case-insensitive substring search over name, email and student id.
    /// A blank query matches everything.
    pub fn filtered(&self, query: &str) -> Vec<RosterStudent> {
        let needle = query.trim().to_lowercase();
        let rows = self.rows();
        if needle.is_empty() {
            return rows;
        }
        rows.into_iter()
            .filter(|r| {
                [&r.name, &r.email, &r.id]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Rows in `program`, matched by full name or abbreviation.
    pub fn in_program(&self, program: &str) -> Vec<RosterStudent> {
        let program = program.trim();
        self.rows()
            .into_iter()
            .filter(|r| {
                r.program.eq_ignore_ascii_case(program)
                    || catalog::abbreviation(&r.program).eq_ignore_ascii_case(program)
            })
            .collect()
    }

    /// Rows whose program belongs to the named college. Unknown colleges
    /// match nothing.
    pub fn in_college(&self, college: &str) -> Vec<RosterStudent> {
        let Some(college) = catalog::college(college.trim()) else {
            return Vec::new();
        };
        self.rows()
            .into_iter()
            .filter(|r| catalog::college_of(&r.program) == Some(college))
            .collect()
    }

    /// Short program label for a row, as shown in the roster table.
    pub fn program_label(row: &RosterStudent) -> &str {
        catalog::abbreviation(&row.program)
    }
}

impl Drop for ChecklistBoard {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
