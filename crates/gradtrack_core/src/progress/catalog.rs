//! Colleges and the degree programs they offer, used by roster filters.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramInfo {
    pub name: &'static str,
    pub abbreviation: Option<&'static str>,
}

impl ProgramInfo {
    /// Short label; programs without an abbreviation use their full name.
    pub fn short_name(&self) -> &'static str {
        self.abbreviation.unwrap_or(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct College {
    pub name: &'static str,
    pub programs: &'static [ProgramInfo],
}

const fn program(name: &'static str, abbreviation: &'static str) -> ProgramInfo {
    ProgramInfo {
        name,
        abbreviation: Some(abbreviation),
    }
}

pub const COLLEGES: &[College] = &[
    College {
        name: "College of Computer Studies",
        programs: &[
            program("BS Computer Science", "BSCS"),
            program("BS Information Technology", "BSIT"),
            program("BS Information Systems", "BSIS"),
        ],
    },
    College {
        name: "College of Engineering",
        programs: &[
            program("BS Civil Engineering", "BSCE"),
            program("BS Electrical Engineering", "BSEE"),
            program("BS Mechanical Engineering", "BSME"),
        ],
    },
    College {
        name: "College of Business and Accountancy",
        programs: &[
            program("BS Accountancy", "BSA"),
            program("BS Business Administration", "BSBA"),
        ],
    },
    College {
        name: "College of Nursing",
        programs: &[program("BS Nursing", "BSN")],
    },
    College {
        name: "College of Arts and Sciences",
        programs: &[
            program("BS Psychology", "BS Psych"),
            ProgramInfo {
                name: "AB Communication",
                abbreviation: None,
            },
        ],
    },
];

pub fn college(name: &str) -> Option<&'static College> {
    COLLEGES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

pub fn find_program(name: &str) -> Option<&'static ProgramInfo> {
    COLLEGES
        .iter()
        .flat_map(|c| c.programs)
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn college_of(program_name: &str) -> Option<&'static College> {
    COLLEGES.iter().find(|c| {
        c.programs
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(program_name))
    })
}

/// Abbreviation for a program name; unknown programs come back unchanged.
pub fn abbreviation(program_name: &str) -> &str {
    match find_program(program_name) {
        Some(program) => program.short_name(),
        None => program_name,
    }
}
