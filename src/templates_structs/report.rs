use askama::Template;

use super::PageContext;
use crate::reports::FormReport;

/// One textarea on the reports page.
#[derive(Debug, Clone)]
pub struct ReportBlock {
    pub label: String,
    pub has_submissions: bool,
    pub report_count: usize,
    pub text: String,
}

impl From<&FormReport> for ReportBlock {
    fn from(r: &FormReport) -> Self {
        Self {
            label: r.label().to_string(),
            has_submissions: r.has_submissions(),
            report_count: r.summary.as_ref().map(|s| s.report_count).unwrap_or(0),
            text: r.text.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "reports.html")]
pub struct ReportsTemplate {
    pub ctx: PageContext,
    pub date: String,
    pub error: Option<String>,
    pub blocks: Vec<ReportBlock>,
}
