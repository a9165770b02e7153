use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{csrf, password, rate_limit::RateLimiter, session, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::member::{self, NewMember, SignupForm, normalize_form_class};
use crate::templates_structs::{LoginTemplate, SignupTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location.to_string()))
        .finish()
}

fn login_error(session: &Session, config: &AppConfig, email: &str, msg: &str) -> Result<HttpResponse, AppError> {
    render(LoginTemplate {
        error: Some(msg.to_string()),
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
        email: email.to_string(),
    })
}

pub async fn login_page(
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    // If already logged in, redirect to dashboard
    if session::get_member_id(&session).is_some() {
        return Ok(redirect("/dashboard"));
    }

    render(LoginTemplate {
        error: None,
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(&session),
        email: String::new(),
    })
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check BEFORE any database access
    let ip = req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        log::warn!("Login blocked for {ip}: too many failures");
        return login_error(&session, &config, &form.email,
            "Too many failed login attempts. Please try again later.");
    }

    let found = member::find_by_email(&pool, &form.email).await?;

    let verified = match &found {
        Some(m) => password::verify_password(&form.password, &m.password_hash)?,
        None => false,
    };

    match found {
        Some(m) if verified => {
            limiter.clear(ip);
            session::login(&session, m.id)?;
            log::info!("Member {} logged in", m.email);
            Ok(redirect("/dashboard"))
        }
        _ => {
            limiter.record_failure(ip);
            login_error(&session, &config, &form.email, "Invalid email or password")
        }
    }
}

pub async fn signup_page(
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if session::get_member_id(&session).is_some() {
        return Ok(redirect("/dashboard"));
    }
    render(SignupTemplate {
        errors: vec![],
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(&session),
        email: String::new(),
        full_name: String::new(),
        form_class: String::new(),
    })
}

/// Validate signup form data.
pub fn validate_signup(form: &SignupForm) -> Vec<String> {
    let mut errors = vec![];
    errors.extend(validate::validate_email(&form.email));
    errors.extend(validate::validate_required(&form.full_name, "Full name", 100));
    errors.extend(validate::validate_form_class(&form.form_class));
    errors.extend(validate::validate_password(&form.password));
    errors.extend(validate::validate_password_confirmation(&form.password, &form.confirm_password));
    errors
}

/// New members start with no roles; an administrator grants them.
pub async fn signup_submit(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let rerender = |errors: Vec<String>| {
        render(SignupTemplate {
            errors,
            app_name: config.app_name.clone(),
            csrf_token: csrf::get_or_create_token(&session),
            email: form.email.clone(),
            full_name: form.full_name.clone(),
            form_class: form.form_class.clone(),
        })
    };

    let errors = validate_signup(&form);
    if !errors.is_empty() {
        return rerender(errors);
    }

    if member::find_by_email(&pool, &form.email).await?.is_some() {
        return rerender(vec!["An account with that email already exists".to_string()]);
    }

    let new = NewMember {
        email: form.email.trim().to_lowercase(),
        full_name: form.full_name.trim().to_string(),
        form_class: normalize_form_class(&form.form_class),
        password_hash: password::hash_password(&form.password)?,
    };
    let member_id = member::create(&pool, &new).await?;
    log::info!("New member signed up: {}", new.email);

    session::login(&session, member_id)?;
    session::set_flash(&session, "Welcome! An administrator will assign your role.");
    Ok(redirect("/dashboard"))
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(redirect("/login"))
}
