use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::{Local, Timelike};
use sqlx::SqlitePool;

use crate::auth::Viewer;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::form::GradeLevel;
use crate::models::{member, slip};
use crate::reports;
use crate::templates_structs::{DashboardTemplate, GradeCount, PageContext, slip_views};

fn time_greeting(name: &str) -> String {
    let period = match Local::now().hour() {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{period}, {name}")
}

pub async fn index(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;
    let ctx = PageContext::build(&session, &viewer, &config, "/dashboard");
    let today = reports::today(config.report_utc_offset);

    let mut member_count = 0;
    let mut grade_counts = vec![];
    let mut unattributed_count = 0;
    if viewer.roles.is_admin() {
        member_count = member::count(&pool).await?;
        let counts = slip::count_by_grade(&pool, today).await?;
        grade_counts = GradeLevel::ALL
            .into_iter()
            .map(|g| GradeCount {
                label: g.label().to_string(),
                count: counts.iter().find(|(l, _)| l == g.label()).map(|(_, n)| *n).unwrap_or(0),
            })
            .collect();
        unattributed_count = counts
            .iter()
            .filter(|(l, _)| GradeLevel::from_label(l).is_none())
            .map(|(_, n)| n)
            .sum();
    }

    let recent_slips = if viewer.roles.is_beadle() {
        slip_views(&slip::find_by_submitter(&pool, &viewer.member.email, 5).await?)
    } else {
        vec![]
    };

    let (scope_name, scope_error) = if viewer.roles.is_supervisor() {
        match viewer.roles.supervisor_scope() {
            Ok(scope) => (Some(scope.to_string()), None),
            Err(e) => (None, Some(e.to_string())),
        }
    } else {
        (None, None)
    };

    render(DashboardTemplate {
        greeting: time_greeting(&ctx.full_name),
        ctx,
        today: today.format("%Y-%m-%d").to_string(),
        member_count,
        grade_counts,
        unattributed_count,
        recent_slips,
        scope_name,
        scope_error,
    })
}
