use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::Viewer;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::form::GradeLevel;
use crate::models::slip;
use crate::reports::{self, FormReports, ReportError};
use crate::templates_structs::{PageContext, ReportBlock, ReportsTemplate};

/// Load the day's slips and build every form's report.
pub async fn build_reports(pool: &SqlitePool, date: NaiveDate) -> Result<FormReports, AppError> {
    let rows = slip::find_rows_by_date(pool, date).await?;
    Ok(reports::generate_for_date(date, &rows))
}

#[derive(Deserialize)]
pub struct ReportQuery {
    pub date: Option<String>,
}

/// GET /reports: report text per form, ready to copy into an email.
/// Supervisors only see the forms they supervise.
pub async fn page(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;
    let grades: Vec<GradeLevel> = if viewer.roles.is_admin() {
        GradeLevel::ALL.to_vec()
    } else {
        viewer.supervisor_scope()?.grade_levels()
    };

    let ctx = PageContext::build(&session, &viewer, &config, "/reports");

    let date = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(d) => reports::parse_report_date(d),
        None => Ok(reports::today(config.report_utc_offset)),
    };
    let date = match date {
        Ok(d) => d,
        Err(e) => {
            return render(ReportsTemplate {
                ctx,
                date: query.date.clone().unwrap_or_default(),
                error: Some(e.to_string()),
                blocks: vec![],
            });
        }
    };

    let all = build_reports(&pool, date).await?;
    let blocks = all.for_grades(&grades).iter().map(ReportBlock::from).collect();

    render(ReportsTemplate { ctx, date: all.date_string(), error: None, blocks })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportAction {
    Generate,
    Scheduled,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub action: ReportAction,
    pub date: Option<String>,
}

/// POST /api/reports: `{action: "generate"|"scheduled", date?}` returns
/// `{date, reports: {"<form>": "<text>"}}`. `generate` needs an explicit
/// date; `scheduled` always reports on today.
pub async fn api_generate(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;
    viewer.require_admin()?;

    let all = match body.action {
        ReportAction::Scheduled => build_reports(&pool, reports::today(config.report_utc_offset)).await?,
        ReportAction::Generate => match reports::parse_report_date(body.date.as_deref().unwrap_or("")) {
            Ok(date) => build_reports(&pool, date).await?,
            Err(e) => return Ok(bad_request(&e)),
        },
    };
    log::info!("{} generated reports for {} via API ({:?})", viewer.member.email, all.date_string(), body.action);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "date": all.date_string(),
        "reports": all,
    })))
}

fn bad_request(e: &ReportError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}
