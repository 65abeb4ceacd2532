//! Checklist status derivation.
//!
//! The derived status is never stored. Both the server summary endpoint and
//! the client progress views recompute it from a completion rate and a single
//! approval flag.

use serde::{Deserialize, Serialize};

use crate::types::ChecklistItem;

/// Aggregate classification of a student's checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistStatus {
    Incomplete,
    Pending,
    Approved,
}

impl ChecklistStatus {
    /// Upper-case label shown on status pills.
    pub fn label(self) -> &'static str {
        match self {
            Self::Incomplete => "INCOMPLETE",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
        }
    }
}

/// Classify a checklist snapshot.
///
/// Anything below 100% is `Incomplete` even when `is_approved` is set; callers
/// are responsible for clearing a stale approval flag.
pub fn derive_status(completion_rate_percent: f64, is_approved: bool) -> ChecklistStatus {
    if completion_rate_percent < 100.0 {
        ChecklistStatus::Incomplete
    } else if is_approved {
        ChecklistStatus::Approved
    } else {
        ChecklistStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub total_requirements: usize,
    pub completed_requirements: usize,
    pub completion_rate: f64,
}

impl CompletionSummary {
    pub fn new(completed_requirements: usize, total_requirements: usize) -> Self {
        let completion_rate = if total_requirements > 0 {
            completed_requirements as f64 * 100.0 / total_requirements as f64
        } else {
            0.0
        };
        Self {
            total_requirements,
            completed_requirements,
            completion_rate,
        }
    }

    /// Summarize a list of per-requirement completion flags.
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let (done, total) = flags
            .into_iter()
            .fold((0, 0), |(done, total), complete| {
                (done + usize::from(complete), total + 1)
            });
        Self::new(done, total)
    }

    /// Summarize a server checklist; an item counts as done once it leaves PENDING.
    pub fn from_checklist(items: &[ChecklistItem]) -> Self {
        Self::from_flags(items.iter().map(|item| item.status.is_complete()))
    }

    pub fn is_complete(&self) -> bool {
        self.completion_rate >= 100.0
    }

    pub fn status(&self, is_approved: bool) -> ChecklistStatus {
        derive_status(self.completion_rate, is_approved)
    }
}

/// Summary plus derived status, as returned by the checklist summary endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSummary {
    #[serde(flatten)]
    pub completion: CompletionSummary,
    pub status: ChecklistStatus,
}

impl ChecklistSummary {
    pub fn new(completion: CompletionSummary, is_approved: bool) -> Self {
        Self {
            completion,
            status: completion.status(is_approved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentStatus, DocumentType};
    use uuid::Uuid;

    #[test]
    fn full_and_approved_is_approved() {
        assert_eq!(derive_status(100.0, true), ChecklistStatus::Approved);
    }

    #[test]
    fn full_and_unapproved_is_pending() {
        assert_eq!(derive_status(100.0, false), ChecklistStatus::Pending);
    }

    #[test]
    fn approval_ignored_below_full() {
        assert_eq!(derive_status(99.9, true), ChecklistStatus::Incomplete);
    }

    #[test]
    fn empty_requirement_list_is_incomplete() {
        let summary = CompletionSummary::from_flags(Vec::<bool>::new());
        assert_eq!(summary.total_requirements, 0);
        assert_eq!(summary.completion_rate, 0.0);
        assert!(!summary.completion_rate.is_nan());
        assert_eq!(derive_status(0.0, false), ChecklistStatus::Incomplete);
        assert_eq!(summary.status(true), ChecklistStatus::Incomplete);
    }

    #[test]
    fn six_of_ten_is_sixty_percent() {
        let mut flags = vec![true; 6];
        flags.extend([false; 4]);
        let summary = CompletionSummary::from_flags(flags);
        assert_eq!(summary.completed_requirements, 6);
        assert_eq!(summary.total_requirements, 10);
        assert_eq!(summary.completion_rate, 60.0);
        assert_eq!(summary.status(false), ChecklistStatus::Incomplete);
    }

    #[test]
    fn checklist_summary_counts_non_pending_items() {
        let statuses = [
            DocumentStatus::Submitted,
            DocumentStatus::Approved,
            DocumentStatus::Rejected,
            DocumentStatus::Pending,
        ];
        let items: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let doc = DocumentType {
                    id: Uuid::new_v4(),
                    code: format!("D{i}"),
                    name: format!("Doc {i}"),
                    description: None,
                    is_required: true,
                };
                ChecklistItem {
                    status: *status,
                    ..ChecklistItem::unsubmitted(&doc)
                }
            })
            .collect();
        let summary = CompletionSummary::from_checklist(&items);
        assert_eq!(summary.completed_requirements, 3);
        assert_eq!(summary.completion_rate, 75.0);
    }

    #[test]
    fn summary_serializes_flat() {
        let s = ChecklistSummary::new(CompletionSummary::new(2, 2), true);
        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["completedRequirements"], serde_json::json!(2));
        assert_eq!(json["completionRate"], serde_json::json!(100.0));
        assert_eq!(json["status"], serde_json::json!("approved"));
    }

    #[test]
    fn labels() {
        assert_eq!(ChecklistStatus::Incomplete.label(), "INCOMPLETE");
        assert_eq!(ChecklistStatus::Pending.label(), "PENDING");
        assert_eq!(ChecklistStatus::Approved.label(), "APPROVED");
    }
}
