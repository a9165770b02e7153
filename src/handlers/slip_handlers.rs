use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{Viewer, csrf, session};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::form::GradeLevel;
use crate::models::slip::{self, NewSlip, SlipForm};
use crate::reports;
use crate::templates_structs::{
    MySlipsTemplate, PageContext, SelectOption, SlipFormTemplate, SlipListTemplate, slip_views,
};

pub async fn new_form(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;
    viewer.require_beadle()?;

    // Default the grade to the beadle's own form.
    let grade = viewer
        .member
        .form_class
        .as_deref()
        .and_then(GradeLevel::from_form_class)
        .map(|g| g.label().to_string())
        .unwrap_or_default();

    let values = SlipForm {
        grade_level: grade.clone(),
        class_name: viewer.member.form_class.clone().unwrap_or_default(),
        date: reports::today(config.report_utc_offset).format("%Y-%m-%d").to_string(),
        ..Default::default()
    };

    let ctx = PageContext::build(&session, &viewer, &config, "/slips/new");
    render(SlipFormTemplate {
        ctx,
        errors: vec![],
        values,
        grade_options: SelectOption::grade_levels(&grade),
        double_checked: false,
    })
}

pub async fn create(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<SlipForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let viewer = Viewer::load(&session, &pool).await?;
    viewer.require_beadle()?;

    let form = form.into_inner();
    match NewSlip::from_form(&form, &viewer.member.email) {
        Ok(new) => {
            let id = slip::create(&pool, &new).await?;
            log::info!(
                "Slip {id} submitted by {} for {} {} on {}",
                new.beadle_email, new.grade_level, new.class_name, new.date
            );
            session::set_flash(&session, "Attendance slip submitted");
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/slips/mine"))
                .finish())
        }
        Err(errors) => {
            let ctx = PageContext::build(&session, &viewer, &config, "/slips/new");
            let grade_options = SelectOption::grade_levels(&form.grade_level);
            let double_checked = form.is_double_session.is_some();
            render(SlipFormTemplate { ctx, errors, values: form, grade_options, double_checked })
        }
    }
}

pub async fn mine(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;
    viewer.require_beadle()?;
    let slips = slip::find_by_submitter(&pool, &viewer.member.email, 100).await?;
    let ctx = PageContext::build(&session, &viewer, &config, "/slips/mine");
    render(MySlipsTemplate { ctx, slips: slip_views(&slips) })
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
    pub grade: Option<String>,
}

/// Slips for one day. Administrators see every form; supervisors only theirs.
pub async fn list(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;

    let allowed: Vec<GradeLevel> = if viewer.roles.is_admin() {
        GradeLevel::ALL.to_vec()
    } else {
        viewer.supervisor_scope()?.grade_levels()
    };

    let date = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(d) => reports::parse_report_date(d)?,
        None => reports::today(config.report_utc_offset),
    };

    let grade_filter = query.grade.as_deref().and_then(GradeLevel::from_label);
    let grades: Vec<GradeLevel> = match grade_filter {
        Some(g) if allowed.contains(&g) => vec![g],
        Some(_) => return Err(AppError::PermissionDenied("form outside your scope".to_string())),
        None => allowed.clone(),
    };

    let slips = slip::find_by_date(&pool, date, Some(&grades)).await?;

    let ctx = PageContext::build(&session, &viewer, &config, "/slips");
    let selected = grade_filter.map(|g| g.label()).unwrap_or("");
    let grade_options = SelectOption::grade_levels(selected)
        .into_iter()
        .filter(|o| GradeLevel::from_label(&o.value).is_some_and(|g| allowed.contains(&g)))
        .collect();

    render(SlipListTemplate {
        ctx,
        title: format!("Attendance slips for {}", date.format("%A, %-d %B %Y")),
        date: date.format("%Y-%m-%d").to_string(),
        grade_options,
        show_grade_filter: allowed.len() > 1,
        slips: slip_views(&slips),
    })
}
