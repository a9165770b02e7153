use askama::Template;

use super::{PageContext, SelectOption};
use crate::models::slip::{AttendanceSlip, SlipForm};

/// Display-ready slip with optional fields already formatted.
#[derive(Debug, Clone)]
pub struct SlipView {
    pub id: i64,
    pub date: String,
    pub grade_level: String,
    pub class_name: String,
    pub subject: String,
    pub teacher: String,
    pub time_range: String,
    pub teacher_status: String,
    pub homework: String,
    pub students_present: i64,
    pub absent: String,
    pub absent_count: usize,
    pub late: String,
    pub late_count: usize,
    pub double_session: bool,
    pub beadle_email: String,
}

impl From<&AttendanceSlip> for SlipView {
    fn from(s: &AttendanceSlip) -> Self {
        let teacher_status = match (s.teacher_present, &s.teacher_arrival_time, s.substitute_received) {
            (true, Some(t), _) => format!("Present ({t})"),
            (true, None, _) => "Present".to_string(),
            (false, _, Some(true)) => "Absent, substitute".to_string(),
            (false, _, _) => "Absent".to_string(),
        };
        Self {
            id: s.id,
            date: s.date.format("%Y-%m-%d").to_string(),
            grade_level: s.grade_level.label().to_string(),
            class_name: s.class_name.clone(),
            subject: s.subject.clone(),
            teacher: s.teacher.clone(),
            time_range: s.time_range(),
            teacher_status,
            homework: match s.homework_given {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => "-".to_string(),
            },
            students_present: s.students_present,
            absent: s.absent_students.join(", "),
            absent_count: s.absent_students.len(),
            late: s.late_students.join(", "),
            late_count: s.late_students.len(),
            double_session: s.is_double_session,
            beadle_email: s.beadle_email.clone(),
        }
    }
}

pub fn slip_views(slips: &[AttendanceSlip]) -> Vec<SlipView> {
    slips.iter().map(SlipView::from).collect()
}

#[derive(Template)]
#[template(path = "slips/form.html")]
pub struct SlipFormTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
    pub values: SlipForm,
    pub grade_options: Vec<SelectOption>,
    pub double_checked: bool,
}

#[derive(Template)]
#[template(path = "slips/list.html")]
pub struct SlipListTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub date: String,
    pub grade_options: Vec<SelectOption>,
    pub show_grade_filter: bool,
    pub slips: Vec<SlipView>,
}

#[derive(Template)]
#[template(path = "slips/mine.html")]
pub struct MySlipsTemplate {
    pub ctx: PageContext,
    pub slips: Vec<SlipView>,
}
