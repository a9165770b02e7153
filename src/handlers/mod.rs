pub mod account_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod member_handlers;
pub mod report_handlers;
pub mod slip_handlers;
pub mod supervisor_handlers;

use actix_web::{HttpResponse, middleware::from_fn, web};

use crate::auth::middleware::require_auth;

/// Register every route. Shared with the integration tests so they exercise
/// the same table as the server.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/signup", web::get().to(auth_handlers::signup_page))
        .route("/signup", web::post().to(auth_handlers::signup_submit))
        .route("/", web::get().to(|| async {
            HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish()
        }))
        // Protected routes
        .service(
            web::scope("")
                .wrap(from_fn(require_auth))
                .route("/dashboard", web::get().to(dashboard::index))
                .route("/logout", web::post().to(auth_handlers::logout))
                .route("/account", web::get().to(account_handlers::form))
                .route("/account", web::post().to(account_handlers::submit))
                // Slips: /slips/new and /slips/mine BEFORE any /slips/{..}
                .route("/slips/new", web::get().to(slip_handlers::new_form))
                .route("/slips/mine", web::get().to(slip_handlers::mine))
                .route("/slips", web::get().to(slip_handlers::list))
                .route("/slips", web::post().to(slip_handlers::create))
                // Member administration
                .route("/members", web::get().to(member_handlers::list))
                .route("/members/bulk-role", web::post().to(member_handlers::bulk_role))
                .route("/members/{id}/roles", web::post().to(member_handlers::toggle_role))
                .route("/members/{id}/delete", web::post().to(member_handlers::delete))
                // Supervisor
                .route("/supervisor", web::get().to(supervisor_handlers::index))
                .route("/supervisor/beadles/{id}", web::post().to(supervisor_handlers::toggle_beadle))
                // Reports
                .route("/reports", web::get().to(report_handlers::page))
                .route("/api/reports", web::post().to(report_handlers::api_generate)),
        );
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../../templates/errors/404.html"))
}
