use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::auth::{Viewer, csrf, password, session, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::member::{self, AccountForm, normalize_form_class};
use crate::templates_structs::{AccountTemplate, PageContext};

pub async fn form(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::load(&session, &pool).await?;
    let ctx = PageContext::build(&session, &viewer, &config, "/account");
    render(AccountTemplate {
        ctx,
        errors: vec![],
        full_name: viewer.member.full_name.clone(),
        form_class: viewer.member.form_class.clone().unwrap_or_default(),
    })
}

pub async fn submit(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<AccountForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let viewer = Viewer::load(&session, &pool).await?;

    let mut errors = vec![];
    errors.extend(validate::validate_required(&form.full_name, "Full name", 100));
    errors.extend(validate::validate_form_class(&form.form_class));
    if !form.new_password.is_empty() {
        errors.extend(validate::validate_password(&form.new_password));
        errors.extend(validate::validate_password_confirmation(&form.new_password, &form.confirm_password));
    }

    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &viewer, &config, "/account");
        return render(AccountTemplate {
            ctx,
            errors,
            full_name: form.full_name.clone(),
            form_class: form.form_class.clone(),
        });
    }

    let form_class = normalize_form_class(&form.form_class);
    member::update_profile(&pool, viewer.id(), form.full_name.trim(), form_class.as_deref()).await?;

    if !form.new_password.is_empty() {
        let hashed = password::hash_password(&form.new_password)?;
        member::update_password(&pool, viewer.id(), &hashed).await?;
        log::info!("Member {} changed their password", viewer.member.email);
    }

    session::set_flash(&session, "Account updated");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/account"))
        .finish())
}
