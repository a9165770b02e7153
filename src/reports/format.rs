use std::fmt::Write;

use chrono::NaiveDate;

use super::{FormSummary, NO_SUBMISSIONS};
use crate::models::form::GradeLevel;
use crate::models::slip::AttendanceSlip;

const RULE: &str = "========================================";
const THIN_RULE: &str = "----------------------------------------";

fn header(out: &mut String, grade: GradeLevel, date: NaiveDate) {
    let _ = writeln!(out, "ATTENDANCE REPORT: {}", grade.label());
    let _ = writeln!(out, "Date: {} ({})", date.format("%A, %-d %B %Y"), date.format("%Y-%m-%d"));
    let _ = writeln!(out, "{RULE}");
    out.push('\n');
}

fn name_list(names: &[String]) -> String {
    if names.is_empty() { "none".to_string() } else { names.join(", ") }
}

pub(super) fn render_empty(grade: GradeLevel, date: NaiveDate) -> String {
    let mut out = String::new();
    header(&mut out, grade, date);
    let _ = writeln!(out, "{NO_SUBMISSIONS}");
    let _ = writeln!(out, "No attendance slips were received for this form on this date.");
    out
}

pub(super) fn render_form(
    grade: GradeLevel,
    date: NaiveDate,
    summary: &FormSummary,
    slips: &[&AttendanceSlip],
) -> String {
    let mut out = String::new();
    header(&mut out, grade, date);

    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "Reports submitted: {}", summary.report_count);
    let _ = writeln!(out, "Teacher present:   {}", summary.teacher_present_count);
    let _ = writeln!(out, "Teacher absent:    {}", summary.teacher_absent_count);
    let _ = writeln!(out, "Students present:  {}", summary.present_count);
    let _ = writeln!(out, "Students absent:   {}", summary.absent_count);
    let _ = writeln!(out, "Students late:     {}", summary.late_count);
    out.push('\n');

    let _ = writeln!(out, "CLASS REPORTS");
    let _ = writeln!(out, "{THIN_RULE}");
    for (i, slip) in slips.iter().enumerate() {
        render_slip(&mut out, i + 1, slip);
    }
    out
}

fn render_slip(out: &mut String, n: usize, slip: &AttendanceSlip) {
    let double = if slip.is_double_session { " (double session)" } else { "" };
    let _ = writeln!(
        out,
        "{n}. {} | {} | {} | {}{double}",
        slip.class_name,
        slip.subject,
        slip.teacher,
        slip.time_range()
    );

    let teacher = match (slip.teacher_present, &slip.teacher_arrival_time, slip.substitute_received) {
        (true, Some(t), _) => format!("present (arrived {t})"),
        (true, None, _) => "present".to_string(),
        (false, _, Some(true)) => "absent, substitute received".to_string(),
        (false, _, Some(false)) => "absent, no substitute".to_string(),
        (false, _, None) => "absent".to_string(),
    };
    let _ = writeln!(out, "   Teacher: {teacher}");

    let homework = match slip.homework_given {
        Some(true) => "yes",
        Some(false) => "no",
        None => "not recorded",
    };
    let _ = writeln!(out, "   Homework given: {homework}");
    let _ = writeln!(
        out,
        "   Present: {} | Absent: {} | Late: {}",
        slip.students_present,
        slip.absent_students.len(),
        slip.late_students.len()
    );
    let _ = writeln!(out, "   Absent students: {}", name_list(&slip.absent_students));
    let _ = writeln!(out, "   Late students: {}", name_list(&slip.late_students));
    let _ = writeln!(out, "   Submitted by: {}", slip.beadle_email);
    out.push('\n');
}
