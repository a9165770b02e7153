use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{Viewer, csrf, session};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::{member, role};
use crate::templates_structs::{MemberListTemplate, MemberRow, PageContext};

fn back_to_members() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", "/members"))
        .finish()
}

/// True when `member_id` is the only holder of the admin role.
pub async fn is_last_admin(pool: &SqlitePool, member_id: i64) -> Result<bool, AppError> {
    let Some(admin) = role::find_by_name(pool, role::ADMIN).await? else {
        return Ok(false);
    };
    if !role::member_has_role(pool, member_id, admin.id).await? {
        return Ok(false);
    }
    Ok(role::count_members_with(pool, role::ADMIN).await? <= 1)
}

pub async fn list(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;
    viewer.require_admin()?;

    let roles = role::find_all_with_counts(&pool).await?;
    let members = member::find_all_with_roles(&pool).await?
        .iter()
        .map(|m| MemberRow::build(m, &roles, viewer.id()))
        .collect();

    let ctx = PageContext::build(&session, &viewer, &config, "/members");
    render(MemberListTemplate { ctx, members, roles })
}

#[derive(Deserialize)]
pub struct RoleToggleForm {
    pub role_name: String,
    pub csrf_token: String,
}

/// POST /members/{id}/roles: grant or remove one role.
pub async fn toggle_role(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<RoleToggleForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let viewer = Viewer::load(&session, &pool).await?;
    viewer.require_admin()?;

    let member_id = path.into_inner();
    let target = member::find_summary_by_id(&pool, member_id).await?.ok_or(AppError::NotFound)?;
    let role_row = role::find_by_name(&pool, &form.role_name).await?.ok_or(AppError::NotFound)?;

    if role_row.role_name == role::ADMIN && is_last_admin(&pool, member_id).await? {
        session::set_flash(&session, "Cannot remove role: this is the last administrator");
        return Ok(back_to_members());
    }

    let now_held = role::toggle(&pool, member_id, role_row.id).await?;
    log::info!(
        "{} {} role '{}' {} {}",
        viewer.member.email,
        if now_held { "granted" } else { "removed" },
        role_row.role_name,
        if now_held { "to" } else { "from" },
        target.email
    );

    let msg = if now_held {
        format!("{} is now {}", target.email, role_row.display_name)
    } else {
        format!("Removed {} from {}", role_row.display_name, target.email)
    };
    session::set_flash(&session, &msg);
    Ok(back_to_members())
}

#[derive(Deserialize)]
pub struct BulkRoleForm {
    /// Comma-separated member ids.
    pub member_ids: String,
    pub role_name: String,
    pub csrf_token: String,
}

/// Parse "1, 2,3" into ids, dropping blanks and duplicates.
pub fn parse_member_ids(raw: &str) -> Result<Vec<i64>, String> {
    let mut ids = vec![];
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id = part
            .parse::<i64>()
            .map_err(|_| format!("'{part}' is not a member id"))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// POST /members/bulk-role: grant one role to every selected member.
/// Existing roles are kept.
pub async fn bulk_role(
    pool: web::Data<SqlitePool>,
    session: Session,
    form: web::Form<BulkRoleForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let viewer = Viewer::load(&session, &pool).await?;
    viewer.require_admin()?;

    let ids = parse_member_ids(&form.member_ids).map_err(AppError::Validation)?;
    if ids.is_empty() {
        session::set_flash(&session, "Select at least one member");
        return Ok(back_to_members());
    }
    let role_row = role::find_by_name(&pool, &form.role_name).await?.ok_or(AppError::NotFound)?;

    let created = role::bulk_assign(&pool, &ids, role_row.id).await?;
    log::info!(
        "{} granted '{}' to {} member(s), {} new assignment(s)",
        viewer.member.email, role_row.role_name, ids.len(), created
    );
    session::set_flash(
        &session,
        &format!("{} granted to {} member(s) ({} new)", role_row.display_name, ids.len(), created),
    );
    Ok(back_to_members())
}

#[derive(Deserialize)]
pub struct CsrfForm {
    pub csrf_token: String,
}

/// POST /members/{id}/delete
pub async fn delete(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let viewer = Viewer::load(&session, &pool).await?;
    viewer.require_admin()?;

    let member_id = path.into_inner();
    if member_id == viewer.id() {
        session::set_flash(&session, "You cannot delete your own account");
        return Ok(back_to_members());
    }
    if is_last_admin(&pool, member_id).await? {
        session::set_flash(&session, "Cannot delete the last administrator");
        return Ok(back_to_members());
    }

    let target = member::find_summary_by_id(&pool, member_id).await?.ok_or(AppError::NotFound)?;
    member::delete(&pool, member_id).await?;
    log::info!("{} deleted member {}", viewer.member.email, target.email);

    session::set_flash(&session, &format!("Deleted {}", target.email));
    Ok(back_to_members())
}

#[cfg(test)]
mod tests {
    use super::parse_member_ids;

    #[test]
    fn parses_and_dedupes_ids() {
        assert_eq!(parse_member_ids("1, 2,,3,2").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_member_ids("").unwrap(), Vec::<i64>::new());
        assert!(parse_member_ids("1,x").is_err());
    }
}
