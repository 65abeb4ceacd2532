//! Baseline student data the progress views start from before local
//! overrides are applied.

use serde::{Deserialize, Serialize};

use crate::status::ChecklistStatus;
use crate::types::ChecklistItem;

/// One graduation requirement as the client views see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub label: String,
    pub complete: bool,
}

impl Requirement {
    pub fn new(label: impl Into<String>, complete: bool) -> Self {
        Self {
            label: label.into(),
            complete,
        }
    }

    /// Baseline requirements from a server checklist. An item counts as
    /// complete once its submission has left PENDING.
    pub fn from_checklist(items: &[ChecklistItem]) -> Vec<Self> {
        items
            .iter()
            .map(|item| Self::new(item.name.clone(), item.status.is_complete()))
            .collect()
    }
}

/// A roster row as first loaded, before local progress is merged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStudent {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub email: String,
    pub program: String,
    pub completed_requirements: usize,
    pub total_requirements: usize,
    pub status: ChecklistStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDetail {
    pub student: RosterStudent,
    pub requirements: Vec<Requirement>,
    pub achievements: Vec<String>,
}

/// Lower-case, hyphen-separated identifier built from a display name.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// All students known to the client plus the detail records available for
/// some of them. Students without detail fall back to their stored counts.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub students: Vec<RosterStudent>,
    pub details: Vec<StudentDetail>,
}

pub const REQUIREMENT_LABELS: [&str; 10] = [
    "Official Transcript of Record",
    "Thesis / Capstone Submission",
    "Curriculum Evaluation Sheet",
    "Graduation Photo",
    "Graduation Fee Payment Receipt",
    "Library Clearance",
    "Exit Interview Form",
    "Guidance Clearance",
    "Student Account Clearance",
    "OJT Completion Certificate",
];

impl Roster {
    pub fn detail(&self, slug: &str) -> Option<&StudentDetail> {
        self.details.iter().find(|d| d.student.slug == slug)
    }

    /// Add a student together with a full detail record.
    pub fn push_detail(&mut self, detail: StudentDetail) {
        self.students.push(detail.student.clone());
        self.details.push(detail);
    }

    /// Demo roster used when the client runs without a backend.
    pub fn sample() -> Self {
        let rows: [(&str, &str, [bool; 10], &[&str], ChecklistStatus); 5] = [
            (
                "202312263",
                "Maria Clara Santos",
                [false, true, true, true, true, true, false, false, true, false],
                &["Summa Cum Laude", "Dean's Lister"],
                ChecklistStatus::Incomplete,
            ),
            (
                "202312264",
                "Jose Miguel Cruz",
                [true, false, false, false, false, false, false, false, false, false],
                &[],
                ChecklistStatus::Incomplete,
            ),
            (
                "202312265",
                "Andrea Lim",
                [true; 10],
                &["Dean's Lister"],
                ChecklistStatus::Pending,
            ),
            (
                "202312266",
                "Paolo Reyes",
                [true, true, true, false, false, false, false, false, false, false],
                &[],
                ChecklistStatus::Incomplete,
            ),
            (
                "202312267",
                "Bea Villanueva Jr.",
                [true; 10],
                &["Medal of Excellence"],
                ChecklistStatus::Pending,
            ),
        ];

        let mut roster = Self::default();
        for (id, name, flags, achievements, status) in rows {
            let requirements: Vec<_> = REQUIREMENT_LABELS
                .iter()
                .zip(flags)
                .map(|(label, complete)| Requirement::new(*label, complete))
                .collect();
            roster.push_detail(StudentDetail {
                student: RosterStudent {
                    id: id.to_string(),
                    slug: slugify(name),
                    name: name.to_string(),
                    email: format!("{id}@students.example.edu"),
                    program: "BS Information Technology".to_string(),
                    completed_requirements: flags.iter().filter(|f| **f).count(),
                    total_requirements: flags.len(),
                    status,
                },
                requirements,
                achievements: achievements.iter().map(|a| a.to_string()).collect(),
            });
        }
        roster
    }
}
