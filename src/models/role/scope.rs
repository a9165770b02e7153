//! Effective capabilities derived from a member's role rows.
//!
//! Role names are decoded once here; call sites work with [`RoleSet`] and
//! [`SupervisorScope`] instead of matching on strings.

use std::fmt;

use super::types::{RoleRow, ADMIN, BEADLE, TECH_TEAM};
use crate::models::form::{form_class_prefix, GradeLevel};
use crate::models::member::MemberSummary;

/// The form a supervisor has authority over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorScope {
    /// `supervisor_1` .. `supervisor_6`. `Form(6)` spans both sixth-form streams.
    Form(u8),
    /// `supervisor_6a`
    LowerSixth,
    /// `supervisor_6b`
    UpperSixth,
}

impl SupervisorScope {
    /// Decode a role name such as `supervisor_5` or `supervisor_6a`.
    pub fn from_role_name(role_name: &str) -> Option<Self> {
        let lower = role_name.trim().to_ascii_lowercase();
        let suffix = lower.strip_prefix("supervisor_")?;
        match suffix {
            "6a" => Some(SupervisorScope::LowerSixth),
            "6b" => Some(SupervisorScope::UpperSixth),
            _ => match suffix.parse::<u8>() {
                Ok(n) if (1..=6).contains(&n) => Some(SupervisorScope::Form(n)),
                _ => None,
            },
        }
    }

    /// "1".."6", "6A" or "6B".
    pub fn label(&self) -> String {
        match self {
            SupervisorScope::Form(n) => n.to_string(),
            SupervisorScope::LowerSixth => "6A".to_string(),
            SupervisorScope::UpperSixth => "6B".to_string(),
        }
    }

    /// Slip grade levels this supervisor reviews.
    pub fn grade_levels(&self) -> Vec<GradeLevel> {
        match self {
            SupervisorScope::Form(1) => vec![GradeLevel::First],
            SupervisorScope::Form(2) => vec![GradeLevel::Second],
            SupervisorScope::Form(3) => vec![GradeLevel::Third],
            SupervisorScope::Form(4) => vec![GradeLevel::Fourth],
            SupervisorScope::Form(5) => vec![GradeLevel::Fifth],
            SupervisorScope::Form(6) => vec![GradeLevel::SixA, GradeLevel::SixB],
            SupervisorScope::Form(_) => vec![],
            SupervisorScope::LowerSixth => vec![GradeLevel::SixA],
            SupervisorScope::UpperSixth => vec![GradeLevel::SixB],
        }
    }

    /// True when the prefix of `form_class` (before `-`) names this scope.
    pub fn covers_form_class(&self, form_class: &str) -> bool {
        let Some(prefix) = form_class_prefix(form_class) else {
            return false;
        };
        if prefix.eq_ignore_ascii_case(&self.label()) {
            return true;
        }
        match GradeLevel::from_form_class(form_class) {
            Some(g) => *self == SupervisorScope::Form(6) && self.grade_levels().contains(&g),
            None => false,
        }
    }
}

impl fmt::Display for SupervisorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorScope::Form(6) => f.write_str("Sixth Form"),
            SupervisorScope::Form(n) => {
                let g = self.grade_levels();
                match g.first() {
                    Some(level) => f.write_str(level.label()),
                    None => write!(f, "Form {n}"),
                }
            }
            SupervisorScope::LowerSixth => f.write_str("6A"),
            SupervisorScope::UpperSixth => f.write_str("6B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// No supervisor role is held.
    Unscoped,
    /// More than one distinct supervisor role is held.
    Ambiguous(Vec<String>),
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::Unscoped => write!(f, "No supervisor role assigned"),
            ScopeError::Ambiguous(names) => {
                write!(f, "Conflicting supervisor roles: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for ScopeError {}

/// Role names held by one member, in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(pub Vec<String>);

impl RoleSet {
    pub fn from_rows(rows: &[RoleRow]) -> Self {
        let mut names: Vec<String> = Vec::with_capacity(rows.len());
        for row in rows {
            if !names.iter().any(|n| n == &row.role_name) {
                names.push(row.role_name.clone());
            }
        }
        RoleSet(names)
    }

    pub fn has(&self, role_name: &str) -> bool {
        self.0.iter().any(|r| r == role_name)
    }

    pub fn is_admin(&self) -> bool {
        self.has(ADMIN) || self.has(TECH_TEAM)
    }

    pub fn is_beadle(&self) -> bool {
        self.has(BEADLE)
    }

    pub fn is_supervisor(&self) -> bool {
        self.0.iter().any(|r| SupervisorScope::from_role_name(r).is_some())
    }

    /// The single form this member supervises.
    pub fn supervisor_scope(&self) -> Result<SupervisorScope, ScopeError> {
        let found: Vec<(&String, SupervisorScope)> = self
            .0
            .iter()
            .filter_map(|r| SupervisorScope::from_role_name(r).map(|s| (r, s)))
            .collect();

        match found.as_slice() {
            [] => Err(ScopeError::Unscoped),
            [(_, scope)] => Ok(*scope),
            [(_, first), rest @ ..] if rest.iter().all(|(_, s)| s == first) => Ok(*first),
            _ => {
                let names: Vec<String> = found.iter().map(|(r, _)| (*r).clone()).collect();
                log::warn!("Member holds conflicting supervisor roles: {}", names.join(", "));
                Err(ScopeError::Ambiguous(names))
            }
        }
    }

    pub fn join(&self, sep: &str) -> String {
        self.0.join(sep)
    }
}

/// Members whose form class falls inside `scope`.
pub fn filter_members_in_scope<'a>(
    members: &'a [MemberSummary],
    scope: &SupervisorScope,
) -> Vec<&'a MemberSummary> {
    members
        .iter()
        .filter(|m| {
            m.form_class
                .as_deref()
                .is_some_and(|fc| scope.covers_form_class(fc))
        })
        .collect()
}
