use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::FromRow;

use crate::models::form::GradeLevel;

/// Largest head count a single slip may report.
pub const MAX_STUDENTS_PRESENT: i64 = 200;

/// A stored slip exactly as the table holds it. Columns may be NULL for
/// imported rows, and numeric columns arrive as text so a mistyped legacy
/// value fails one row instead of the whole query. Convert with
/// `AttendanceSlip::try_from` before use.
#[derive(Debug, Clone, Default, FromRow)]
pub struct SlipRow {
    pub id: i64,
    pub beadle_email: String,
    pub grade_level: Option<String>,
    pub class_name: Option<String>,
    pub class_start_time: Option<String>,
    pub class_end_time: Option<String>,
    pub date: Option<String>,
    pub teacher: Option<String>,
    pub subject: Option<String>,
    pub teacher_present: Option<String>,
    pub teacher_arrival_time: Option<String>,
    pub substitute_received: Option<String>,
    pub homework_given: Option<String>,
    pub students_present: Option<String>,
    pub absent_students: String,
    pub late_students: String,
    pub is_double_session: Option<String>,
    pub created_at: String,
}

/// A validated attendance slip.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSlip {
    pub id: i64,
    pub beadle_email: String,
    pub grade_level: GradeLevel,
    pub class_name: String,
    pub class_start_time: Option<String>,
    pub class_end_time: Option<String>,
    pub date: NaiveDate,
    pub teacher: String,
    pub subject: String,
    pub teacher_present: bool,
    pub teacher_arrival_time: Option<String>,
    pub substitute_received: Option<bool>,
    pub homework_given: Option<bool>,
    pub students_present: i64,
    pub absent_students: Vec<String>,
    pub late_students: Vec<String>,
    pub is_double_session: bool,
    pub created_at: String,
}

impl AttendanceSlip {
    pub fn time_range(&self) -> String {
        let start = self.class_start_time.as_deref().unwrap_or("--:--");
        let end = self.class_end_time.as_deref().unwrap_or("--:--");
        format!("{start}-{end}")
    }
}

/// Why a stored row could not be turned into an `AttendanceSlip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlipDefect {
    MissingField(&'static str),
    UnknownGradeLevel(String),
    InvalidDate(String),
    InvalidAnswer { field: &'static str, value: String },
    InvalidCount(String),
    MalformedNames { field: &'static str, reason: String },
}

impl fmt::Display for SlipDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlipDefect::MissingField(field) => write!(f, "missing {field}"),
            SlipDefect::UnknownGradeLevel(v) => write!(f, "unknown grade level '{v}'"),
            SlipDefect::InvalidDate(v) => write!(f, "invalid date '{v}'"),
            SlipDefect::InvalidAnswer { field, value } => {
                write!(f, "{field} must be yes or no, got '{value}'")
            }
            SlipDefect::InvalidCount(v) => {
                write!(f, "students_present must be 0 to {MAX_STUDENTS_PRESENT}, got '{v}'")
            }
            SlipDefect::MalformedNames { field, reason } => write!(f, "malformed {field}: {reason}"),
        }
    }
}

impl std::error::Error for SlipDefect {}

/// Parse a yes/no answer, case-insensitively.
pub fn parse_yes_no(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, SlipDefect> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(SlipDefect::MissingField(field)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn optional_yes_no(value: Option<String>, field: &'static str) -> Result<Option<bool>, SlipDefect> {
    match optional(value) {
        None => Ok(None),
        Some(v) => parse_yes_no(&v)
            .map(Some)
            .ok_or(SlipDefect::InvalidAnswer { field, value: v }),
    }
}

fn head_count(value: Option<String>) -> Result<i64, SlipDefect> {
    let raw = required(value, "students_present")?;
    match raw.parse::<i64>() {
        Ok(n) if (0..=MAX_STUDENTS_PRESENT).contains(&n) => Ok(n),
        _ => Err(SlipDefect::InvalidCount(raw)),
    }
}

/// Stored flags are 0/1, but imported rows may spell them out.
fn flag(value: Option<String>, field: &'static str) -> Result<bool, SlipDefect> {
    match optional(value).as_deref() {
        None | Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(v) => parse_yes_no(v).ok_or(SlipDefect::InvalidAnswer { field, value: v.to_string() }),
    }
}

fn names(json: &str, field: &'static str) -> Result<Vec<String>, SlipDefect> {
    if json.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str::<Vec<String>>(json).map_err(|e| SlipDefect::MalformedNames {
        field,
        reason: e.to_string(),
    })
}

impl TryFrom<SlipRow> for AttendanceSlip {
    type Error = SlipDefect;

    fn try_from(row: SlipRow) -> Result<Self, Self::Error> {
        let grade_raw = required(row.grade_level, "grade_level")?;
        let grade_level = GradeLevel::from_label(&grade_raw)
            .ok_or(SlipDefect::UnknownGradeLevel(grade_raw))?;

        let date_raw = required(row.date, "date")?;
        let date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d")
            .map_err(|_| SlipDefect::InvalidDate(date_raw))?;

        let present_raw = required(row.teacher_present, "teacher_present")?;
        let teacher_present = parse_yes_no(&present_raw).ok_or(SlipDefect::InvalidAnswer {
            field: "teacher_present",
            value: present_raw,
        })?;

        let students_present = head_count(row.students_present)?;
        let is_double_session = flag(row.is_double_session, "is_double_session")?;

        Ok(AttendanceSlip {
            id: row.id,
            beadle_email: row.beadle_email,
            grade_level,
            class_name: required(row.class_name, "class_name")?,
            class_start_time: optional(row.class_start_time),
            class_end_time: optional(row.class_end_time),
            date,
            teacher: required(row.teacher, "teacher")?,
            subject: required(row.subject, "subject")?,
            teacher_present,
            teacher_arrival_time: optional(row.teacher_arrival_time),
            substitute_received: optional_yes_no(row.substitute_received, "substitute_received")?,
            homework_given: optional_yes_no(row.homework_given, "homework_given")?,
            students_present,
            absent_students: names(&row.absent_students, "absent_students")?,
            late_students: names(&row.late_students, "late_students")?,
            is_double_session,
            created_at: row.created_at,
        })
    }
}

/// Validated data for a new slip.
#[derive(Debug, Clone)]
pub struct NewSlip {
    pub beadle_email: String,
    pub grade_level: GradeLevel,
    pub class_name: String,
    pub class_start_time: String,
    pub class_end_time: String,
    pub date: NaiveDate,
    pub teacher: String,
    pub subject: String,
    pub teacher_present: bool,
    pub teacher_arrival_time: Option<String>,
    pub substitute_received: Option<bool>,
    pub homework_given: bool,
    pub students_present: i64,
    pub absent_students: Vec<String>,
    pub late_students: Vec<String>,
    pub is_double_session: bool,
}

/// Form data from the slip submission page. Name lists are one name per line.
#[derive(Debug, Default, Deserialize)]
pub struct SlipForm {
    pub grade_level: String,
    pub class_name: String,
    pub class_start_time: String,
    pub class_end_time: String,
    pub date: String,
    pub teacher: String,
    pub subject: String,
    pub teacher_present: String,
    #[serde(default)]
    pub teacher_arrival_time: String,
    #[serde(default)]
    pub substitute_received: String,
    pub homework_given: String,
    pub students_present: String,
    #[serde(default)]
    pub absent_students: String,
    #[serde(default)]
    pub late_students: String,
    #[serde(default)]
    pub is_double_session: Option<String>,
    pub csrf_token: String,
}

/// Split a textarea into trimmed, non-empty names, keeping order.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `HH:MM`, recording an error on failure.
fn parse_time(value: &str, field: &str, errors: &mut Vec<String>) -> Option<NaiveTime> {
    match NaiveTime::parse_from_str(value.trim(), "%H:%M") {
        Ok(t) => Some(t),
        Err(_) => {
            errors.push(format!("{field} must be a time (HH:MM)"));
            None
        }
    }
}

fn hh_mm(t: Option<NaiveTime>) -> String {
    t.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()
}

impl NewSlip {
    /// Validate a submission. Collects every problem instead of stopping at the first.
    pub fn from_form(form: &SlipForm, beadle_email: &str) -> Result<Self, Vec<String>> {
        let mut errors = vec![];

        let grade_level = GradeLevel::from_label(&form.grade_level);
        if grade_level.is_none() {
            errors.push("Grade level must be one of the listed forms".to_string());
        }

        let date = NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() {
            errors.push("Date must be YYYY-MM-DD".to_string());
        }

        for (value, name, max) in [
            (&form.class_name, "Class", 30),
            (&form.teacher, "Teacher", 100),
            (&form.subject, "Subject", 100),
        ] {
            if let Some(msg) = crate::auth::validate::validate_required(value, name, max) {
                errors.push(msg);
            }
        }

        let start = parse_time(&form.class_start_time, "Start time", &mut errors);
        let end = parse_time(&form.class_end_time, "End time", &mut errors);
        if let (Some(s), Some(e)) = (start, end) {
            if e <= s {
                errors.push("End time must be after start time".to_string());
            }
        }

        let teacher_present = parse_yes_no(&form.teacher_present);
        if teacher_present.is_none() {
            errors.push("Say whether the teacher was present".to_string());
        }

        let teacher_arrival_time = match form.teacher_arrival_time.trim() {
            "" => None,
            t if teacher_present == Some(true) => {
                parse_time(t, "Arrival time", &mut errors).map(|t| hh_mm(Some(t)))
            }
            _ => None,
        };

        let substitute_received = if teacher_present == Some(false) {
            match form.substitute_received.trim() {
                "" => None,
                v => {
                    let parsed = parse_yes_no(v);
                    if parsed.is_none() {
                        errors.push("Substitute received must be yes or no".to_string());
                    }
                    parsed
                }
            }
        } else {
            None
        };

        let homework_given = parse_yes_no(&form.homework_given);
        if homework_given.is_none() {
            errors.push("Say whether homework was given".to_string());
        }

        let students_present = match form.students_present.trim().parse::<i64>() {
            Ok(n) if (0..=MAX_STUDENTS_PRESENT).contains(&n) => n,
            _ => {
                errors.push(format!("Students present must be a number between 0 and {MAX_STUDENTS_PRESENT}"));
                0
            }
        };

        let is_double_session = form
            .is_double_session
            .as_deref()
            .is_some_and(|v| matches!(v, "on" | "yes" | "true"));

        match (grade_level, date, teacher_present, homework_given) {
            (Some(grade_level), Some(date), Some(teacher_present), Some(homework_given))
                if errors.is_empty() =>
            {
                Ok(NewSlip {
                    beadle_email: beadle_email.to_string(),
                    grade_level,
                    class_name: form.class_name.trim().to_uppercase(),
                    class_start_time: hh_mm(start),
                    class_end_time: hh_mm(end),
                    date,
                    teacher: form.teacher.trim().to_string(),
                    subject: form.subject.trim().to_string(),
                    teacher_present,
                    teacher_arrival_time,
                    substitute_received,
                    homework_given,
                    students_present,
                    absent_students: split_names(&form.absent_students),
                    late_students: split_names(&form.late_students),
                    is_double_session,
                })
            }
            _ => Err(errors),
        }
    }
}
