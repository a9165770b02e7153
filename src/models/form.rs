use serde::{Deserialize, Serialize};
use std::fmt;

/// A grade-level cohort. Shared by attendance slips (`"5th Form"`) and
/// member form classes (`"5-2"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GradeLevel {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    SixA,
    SixB,
}

impl GradeLevel {
    /// Canonical order; report output follows it.
    pub const ALL: [GradeLevel; 7] = [
        GradeLevel::First,
        GradeLevel::Second,
        GradeLevel::Third,
        GradeLevel::Fourth,
        GradeLevel::Fifth,
        GradeLevel::SixA,
        GradeLevel::SixB,
    ];

    /// Label stored on attendance slips.
    pub fn label(self) -> &'static str {
        match self {
            GradeLevel::First => "1st Form",
            GradeLevel::Second => "2nd Form",
            GradeLevel::Third => "3rd Form",
            GradeLevel::Fourth => "4th Form",
            GradeLevel::Fifth => "5th Form",
            GradeLevel::SixA => "6A",
            GradeLevel::SixB => "6B",
        }
    }

    /// Prefix of a member's form class, e.g. `"5"` in `"5-2"`.
    pub fn class_prefix(self) -> &'static str {
        match self {
            GradeLevel::First => "1",
            GradeLevel::Second => "2",
            GradeLevel::Third => "3",
            GradeLevel::Fourth => "4",
            GradeLevel::Fifth => "5",
            GradeLevel::SixA => "6A",
            GradeLevel::SixB => "6B",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|g| g.label() == label)
    }

    /// Parse the grade out of a form class such as `"6a-1"`.
    pub fn from_form_class(form_class: &str) -> Option<Self> {
        let prefix = form_class_prefix(form_class)?;
        Self::ALL
            .into_iter()
            .find(|g| g.class_prefix().eq_ignore_ascii_case(prefix))
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text before the first `-`, trimmed. `None` when empty.
pub fn form_class_prefix(form_class: &str) -> Option<&str> {
    let prefix = form_class.split('-').next().unwrap_or("").trim();
    if prefix.is_empty() { None } else { Some(prefix) }
}
