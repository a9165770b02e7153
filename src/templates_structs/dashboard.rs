use askama::Template;

use super::{PageContext, SlipView};

/// Slip count for one form, shown on the admin dashboard.
#[derive(Debug, Clone)]
pub struct GradeCount {
    pub label: String,
    pub count: i64,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub greeting: String,
    pub today: String,
    // Admin
    pub member_count: i64,
    pub grade_counts: Vec<GradeCount>,
    pub unattributed_count: i64,
    // Beadle
    pub recent_slips: Vec<SlipView>,
    // Supervisor
    pub scope_name: Option<String>,
    pub scope_error: Option<String>,
}
