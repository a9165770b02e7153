//! Daily attendance reports, one plain-text block per form.
//!
//! The generator only produces text. Sending it is left to whoever reads
//! the reports page or calls the JSON endpoint.

mod format;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{FixedOffset, Local, NaiveDate, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::form::GradeLevel;
use crate::models::slip::{AttendanceSlip, SlipRow};

/// Marker present in the text of every form that received no slips.
pub const NO_SUBMISSIONS: &str = "NO SUBMISSIONS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    MissingDate,
    InvalidDate(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::MissingDate => write!(f, "A report date is required"),
            ReportError::InvalidDate(d) => {
                write!(f, "Invalid report date '{d}': expected YYYY-MM-DD")
            }
        }
    }
}

impl std::error::Error for ReportError {}

/// Totals for one form on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FormSummary {
    pub report_count: usize,
    pub teacher_present_count: usize,
    pub teacher_absent_count: usize,
    pub present_count: i64,
    pub absent_count: usize,
    pub late_count: usize,
}

impl FormSummary {
    pub fn from_slips(slips: &[&AttendanceSlip]) -> Self {
        let mut s = FormSummary { report_count: slips.len(), ..Default::default() };
        for slip in slips {
            if slip.teacher_present {
                s.teacher_present_count += 1;
            } else {
                s.teacher_absent_count += 1;
            }
            s.present_count = s.present_count.saturating_add(slip.students_present);
            s.absent_count = s.absent_count.saturating_add(slip.absent_students.len());
            s.late_count = s.late_count.saturating_add(slip.late_students.len());
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormReport {
    pub grade_level: GradeLevel,
    /// `None` when nothing was submitted.
    pub summary: Option<FormSummary>,
    pub text: String,
}

impl FormReport {
    pub fn has_submissions(&self) -> bool {
        self.summary.is_some()
    }

    pub fn label(&self) -> &'static str {
        self.grade_level.label()
    }
}

/// One report per canonical form, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormReports {
    pub date: NaiveDate,
    reports: BTreeMap<GradeLevel, FormReport>,
}

impl FormReports {
    pub fn get(&self, grade: GradeLevel) -> Option<&FormReport> {
        self.reports.get(&grade)
    }

    /// Look up a report by its form label, e.g. `"5th Form"`.
    pub fn get_by_label(&self, label: &str) -> Option<&FormReport> {
        GradeLevel::from_label(label).and_then(|g| self.get(g))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormReport> {
        self.reports.values()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports for the given forms only, in canonical order.
    pub fn for_grades(&self, grades: &[GradeLevel]) -> Vec<FormReport> {
        self.iter()
            .filter(|r| grades.contains(&r.grade_level))
            .cloned()
            .collect()
    }

    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Serialises as `{ "<form label>": "<report text>", ... }`.
impl Serialize for FormReports {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.reports.len()))?;
        for report in self.reports.values() {
            map.serialize_entry(report.label(), &report.text)?;
        }
        map.end()
    }
}

/// Parse an ISO `YYYY-MM-DD` date. Empty input and bad formats are errors,
/// never a silent default.
pub fn parse_report_date(input: &str) -> Result<NaiveDate, ReportError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ReportError::MissingDate);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDate(trimmed.to_string()))
}

/// Build every form's report for `date` from the loaded slip rows.
pub fn generate_all_supervisor_reports(date: &str, rows: &[SlipRow]) -> Result<FormReports, ReportError> {
    let date = parse_report_date(date)?;
    Ok(generate_for_date(date, rows))
}

/// Same as [`generate_all_supervisor_reports`] with an already-parsed date.
/// Rows that fail validation are logged and skipped.
pub fn generate_for_date(date: NaiveDate, rows: &[SlipRow]) -> FormReports {
    let slips: Vec<AttendanceSlip> = rows
        .iter()
        .cloned()
        .filter_map(|row| {
            let id = row.id;
            match AttendanceSlip::try_from(row) {
                Ok(slip) => Some(slip),
                Err(defect) => {
                    log::warn!("Report {date}: skipping slip {id}: {defect}");
                    None
                }
            }
        })
        .filter(|s| s.date == date)
        .collect();

    let mut groups: BTreeMap<GradeLevel, Vec<&AttendanceSlip>> =
        GradeLevel::ALL.into_iter().map(|g| (g, Vec::new())).collect();
    for slip in &slips {
        groups.entry(slip.grade_level).or_default().push(slip);
    }

    let reports = groups
        .into_iter()
        .map(|(grade, mut group)| {
            let report = if group.is_empty() {
                FormReport { grade_level: grade, summary: None, text: format::render_empty(grade, date) }
            } else {
                group.sort_by(|a, b| {
                    (&a.class_start_time, &a.class_name, a.id)
                        .cmp(&(&b.class_start_time, &b.class_name, b.id))
                });
                let summary = FormSummary::from_slips(&group);
                let text = format::render_form(grade, date, &summary, &group);
                FormReport { grade_level: grade, summary: Some(summary), text }
            };
            (grade, report)
        })
        .collect();

    log::info!("Generated reports for {date} from {} slip(s)", slips.len());
    FormReports { date, reports }
}

/// Today's date in the operational timezone; local time when no offset is set.
pub fn today(utc_offset: Option<FixedOffset>) -> NaiveDate {
    match utc_offset {
        Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
        None => Local::now().date_naive(),
    }
}

/// Build every form's report for the current day.
pub fn generate_reports_for_today(rows: &[SlipRow], utc_offset: Option<FixedOffset>) -> FormReports {
    generate_for_date(today(utc_offset), rows)
}
