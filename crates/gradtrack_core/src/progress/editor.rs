//! Detail-view editing session for one student's checklist.
//!
//! Every edit is written through to the [`ProgressStore`] as it happens, so
//! the store's subscribers see it before the call returns.

use std::sync::Arc;

use thiserror::Error;

use super::roster::{Requirement, StudentDetail};
use super::store::ProgressStore;
use crate::status::{ChecklistStatus, CompletionSummary};

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("requirement index {0} out of range")]
    UnknownRequirement(usize),

    #[error("checklist is {0:.0}% complete; approval needs 100%")]
    Incomplete(f64),

    #[error("checklist already approved")]
    AlreadyApproved,

    #[error("saving progress: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct ChecklistEditor {
    store: Arc<ProgressStore>,
    slug: String,
    base_requirements: Vec<Requirement>,
    base_achievements: Vec<String>,
    base_approved: bool,
    requirements: Vec<Requirement>,
    achievements: Vec<String>,
    approved: bool,
}

impl ChecklistEditor {
    pub fn open(store: Arc<ProgressStore>, detail: &StudentDetail) -> Self {
        let mut editor = Self {
            store,
            slug: detail.student.slug.clone(),
            base_requirements: detail.requirements.clone(),
            base_achievements: detail.achievements.clone(),
            base_approved: detail.student.status == ChecklistStatus::Approved,
            requirements: Vec::new(),
            achievements: Vec::new(),
            approved: false,
        };
        editor.reload();
        editor
    }

    /// Re-read the student's entry, e.g. after another view wrote to it.
    pub fn reload(&mut self) {
        self.requirements = self
            .store
            .requirements_for(&self.slug, &self.base_requirements);
        self.achievements = self
            .store
            .achievements_for(&self.slug, &self.base_achievements);
        // A stale approval never outlives an incomplete checklist.
        self.approved = self.store.approval_for(&self.slug, self.base_approved)
            && self.summary().is_complete();
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn achievements(&self) -> &[String] {
        &self.achievements
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn summary(&self) -> CompletionSummary {
        CompletionSummary::from_flags(self.requirements.iter().map(|r| r.complete))
    }

    pub fn status(&self) -> ChecklistStatus {
        self.summary().status(self.approved)
    }

    pub fn can_approve(&self) -> bool {
        self.summary().is_complete() && !self.approved
    }

    /// Flip one requirement and persist; returns its new completion flag.
    /// Dropping below 100% also persists a cleared approval.
    pub fn toggle_requirement(&mut self, index: usize) -> Result<bool, ProgressError> {
        let mut updated = self.requirements.clone();
        let item = updated
            .get_mut(index)
            .ok_or(ProgressError::UnknownRequirement(index))?;
        item.complete = !item.complete;
        let complete = item.complete;

        self.store.save_requirements(&self.slug, &updated)?;
        self.requirements = updated;
        if self.approved && !self.summary().is_complete() {
            self.store.save_approval(&self.slug, false)?;
            self.approved = false;
        }
        tracing::debug!(slug = %self.slug, index, complete, "requirement toggled");
        Ok(complete)
    }

    /// Returns false when the trimmed text is blank; nothing is written then.
    pub fn add_achievement(&mut self, text: &str) -> Result<bool, ProgressError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let mut updated = self.achievements.clone();
        updated.push(text.to_string());
        self.store.save_achievements(&self.slug, &updated)?;
        self.achievements = updated;
        Ok(true)
    }

    pub fn remove_achievement(&mut self, index: usize) -> Result<Option<String>, ProgressError> {
        if index >= self.achievements.len() {
            return Ok(None);
        }
        let mut updated = self.achievements.clone();
        let removed = updated.remove(index);
        self.store.save_achievements(&self.slug, &updated)?;
        self.achievements = updated;
        Ok(Some(removed))
    }

    pub fn mark_approved(&mut self) -> Result<(), ProgressError> {
        let summary = self.summary();
        if !summary.is_complete() {
            return Err(ProgressError::Incomplete(summary.completion_rate));
        }
        if self.approved {
            return Err(ProgressError::AlreadyApproved);
        }
        self.store.save_approval(&self.slug, true)?;
        self.approved = true;
        tracing::debug!(slug = %self.slug, "student marked approved");
        Ok(())
    }
}
