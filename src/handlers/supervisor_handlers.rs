use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{Viewer, csrf, session};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::role::{self, filter_members_in_scope};
use crate::models::{member, slip};
use crate::reports;
use crate::templates_structs::{PageContext, StudentRow, SupervisorTemplate, slip_views};

/// GET /supervisor: students in the supervised form and today's slips.
pub async fn index(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;
    let scope = viewer.supervisor_scope()?;

    let candidates = member::find_with_form_class(&pool).await?;
    let in_scope = filter_members_in_scope(&candidates, &scope);

    let beadle = role::find_by_name(&pool, role::BEADLE).await?.ok_or(AppError::NotFound)?;
    let mut students = Vec::with_capacity(in_scope.len());
    for m in in_scope {
        students.push(StudentRow {
            id: m.id,
            full_name: m.full_name.clone(),
            email: m.email.clone(),
            form_class: m.form_class_or_dash().to_string(),
            is_beadle: role::member_has_role(&pool, m.id, beadle.id).await?,
        });
    }

    let today = reports::today(config.report_utc_offset);
    let grades = scope.grade_levels();
    let slips = slip::find_by_date(&pool, today, Some(&grades)).await?;

    let ctx = PageContext::build(&session, &viewer, &config, "/supervisor");
    render(SupervisorTemplate {
        ctx,
        scope_name: scope.to_string(),
        today: today.format("%Y-%m-%d").to_string(),
        students,
        slips: slip_views(&slips),
    })
}

#[derive(Deserialize)]
pub struct CsrfForm {
    pub csrf_token: String,
}

/// POST /supervisor/beadles/{id}: grant or remove the beadle role for a
/// student in the supervisor's own form.
pub async fn toggle_beadle(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let viewer = Viewer::load(&session, &pool).await?;
    let scope = viewer.supervisor_scope()?;

    let student = member::find_summary_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    let covered = student
        .form_class
        .as_deref()
        .is_some_and(|fc| scope.covers_form_class(fc));
    if !covered {
        return Err(AppError::PermissionDenied(format!(
            "{} is not in {}",
            student.email, scope
        )));
    }

    let beadle = role::find_by_name(&pool, role::BEADLE).await?.ok_or(AppError::NotFound)?;
    let now_beadle = role::toggle(&pool, student.id, beadle.id).await?;
    log::info!(
        "Supervisor {} set beadle={} for {}",
        viewer.member.email, now_beadle, student.email
    );

    let msg = if now_beadle {
        format!("{} is now a beadle", student.full_name)
    } else {
        format!("{} is no longer a beadle", student.full_name)
    };
    session::set_flash(&session, &msg);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/supervisor"))
        .finish())
}
