use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use askama::Template;
use std::fmt;

use crate::models::role::ScopeError;
use crate::reports::ReportError;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Template(askama::Error),
    Hash(String),
    Session(String),
    Csrf,
    PermissionDenied(String),
    Validation(String),
    Report(ReportError),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::PermissionDenied(what) => write!(f, "Access denied: {what}"),
            AppError::Validation(e) => write!(f, "Validation error: {e}"),
            AppError::Report(e) => write!(f, "{e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Csrf | AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::Report(_) => StatusCode::BAD_REQUEST,
            AppError::Session(_) => StatusCode::SEE_OTHER,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().body("Not Found"),
            AppError::Csrf => HttpResponse::Forbidden().body("Invalid or missing CSRF token"),
            AppError::PermissionDenied(what) => {
                log::info!("Access denied: {what}");
                HttpResponse::Forbidden()
                    .content_type("text/plain; charset=utf-8")
                    .body(format!("Access denied: {what}"))
            }
            AppError::Validation(_) | AppError::Report(_) => {
                HttpResponse::BadRequest().body(self.to_string())
            }
            // Stale or missing session: send the browser back to the login page.
            AppError::Session(e) => {
                log::debug!("Session error: {e}");
                HttpResponse::SeeOther()
                    .insert_header(("Location", "/login"))
                    .finish()
            }
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        AppError::Report(e)
    }
}

impl From<ScopeError> for AppError {
    fn from(e: ScopeError) -> Self {
        AppError::PermissionDenied(e.to_string())
    }
}

/// Render a template into a 200 HTML response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}
