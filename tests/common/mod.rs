//! Shared test infrastructure.
//!
//! Every test gets its own in-memory SQLite database with migrations applied
//! and the role table seeded.

#![allow(dead_code, unused_macros)]

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use regex::Regex;

use beadle::auth::password::hash_password;
use beadle::db::{self, MIGRATOR};
use beadle::models::role;

pub const ADMIN_EMAIL: &str = "admin@school.local";
pub const ADMIN_PASS: &str = "admin123";

/// Fresh database: schema plus seeded roles, no members.
///
/// A single connection with no idle timeout keeps the in-memory database
/// alive for the lifetime of the pool.
pub async fn setup_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid in-memory URL")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    role::seed(&pool).await.expect("Failed to seed roles");
    pool
}

/// Insert a member with a throwaway password hash. Returns the new id.
pub async fn insert_member(pool: &SqlitePool, email: &str, full_name: &str, form_class: Option<&str>) -> i64 {
    sqlx::query("INSERT INTO members (email, full_name, form_class, password_hash) VALUES (?1, ?2, ?3, 'x')")
        .bind(email)
        .bind(full_name)
        .bind(form_class)
        .execute(pool)
        .await
        .expect("Failed to insert member")
        .last_insert_rowid()
}

/// Grant a role by name.
pub async fn grant(pool: &SqlitePool, member_id: i64, role_name: &str) {
    let r = role::find_by_name(pool, role_name)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("role {role_name} not seeded"));
    role::assign(pool, member_id, r.id).await.unwrap();
}

/// Minimal well-formed slip row for `grade` on `date`.
pub struct SlipSeed<'a> {
    pub grade_level: Option<&'a str>,
    pub date: Option<&'a str>,
    pub class_name: &'a str,
    pub start: &'a str,
    pub teacher_present: &'a str,
    pub students_present: Option<i64>,
    pub absent: &'a str,
    pub late: &'a str,
}

impl<'a> SlipSeed<'a> {
    pub fn new(grade_level: &'a str, date: &'a str) -> Self {
        Self {
            grade_level: Some(grade_level),
            date: Some(date),
            class_name: "5-1",
            start: "08:00",
            teacher_present: "yes",
            students_present: Some(30),
            absent: "[]",
            late: "[]",
        }
    }
}

/// Insert a slip directly, bypassing form validation, so tests can store
/// incomplete rows. Returns the new id.
pub async fn insert_slip_row(pool: &SqlitePool, seed: &SlipSeed<'_>) -> i64 {
    sqlx::query(
        "INSERT INTO attendance_slips (beadle_email, grade_level, class_name, class_start_time, \
             class_end_time, date, teacher, subject, teacher_present, homework_given, \
             students_present, absent_students, late_students, is_double_session) \
         VALUES ('beadle@school.local', ?1, ?2, ?3, '09:00', ?4, 'Mr Smith', 'Maths', ?5, 'no', ?6, ?7, ?8, 0)",
    )
    .bind(seed.grade_level)
    .bind(seed.class_name)
    .bind(seed.start)
    .bind(seed.date)
    .bind(seed.teacher_present)
    .bind(seed.students_present)
    .bind(seed.absent)
    .bind(seed.late)
    .execute(pool)
    .await
    .expect("Failed to insert slip")
    .last_insert_rowid()
}

/// Database with roles and the first administrator seeded, as at startup.
pub async fn seeded_pool() -> SqlitePool {
    let pool = setup_test_db().await;
    let hash = hash_password(ADMIN_PASS).unwrap();
    db::seed(&pool, ADMIN_EMAIL, &hash).await.unwrap();
    pool
}

/// Insert a member who can log in with `password`. Returns the new id.
pub async fn insert_login(pool: &SqlitePool, email: &str, password: &str, form_class: Option<&str>) -> i64 {
    let hash = hash_password(password).unwrap();
    sqlx::query("INSERT INTO members (email, full_name, form_class, password_hash) VALUES (?1, ?2, ?3, ?4)")
        .bind(email)
        .bind(email.split('@').next().unwrap_or(email))
        .bind(form_class)
        .bind(&hash)
        .execute(pool)
        .await
        .expect("Failed to insert member")
        .last_insert_rowid()
}

pub async fn member_id(pool: &SqlitePool, email: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM members WHERE email = ?1")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn role_names(pool: &SqlitePool, member_id: i64) -> Vec<String> {
    role::find_for_member(pool, member_id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.role_name)
        .collect()
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .map(|c| c.into_owned())
}

pub fn csrf_token(body: &[u8]) -> String {
    let html = std::str::from_utf8(body).unwrap();
    let re = Regex::new(r#"name="csrf_token" value="([0-9a-f]+)""#).unwrap();
    re.captures(html).expect("no csrf token in page")[1].to_string()
}

/// Test service with the production routes, session middleware and state.
macro_rules! app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::generate(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(beadle::config::AppConfig::default()))
                .app_data(actix_web::web::Data::new(beadle::auth::rate_limit::RateLimiter::default()))
                .configure(beadle::handlers::configure),
        )
        .await
    };
}

/// GET /login, then POST credentials with the page's token. Evaluates to
/// the logged-in session cookie.
macro_rules! log_in {
    ($app:expr, $email:expr, $password:expr) => {{
        use actix_web::test;
        let resp = test::call_service(&$app, test::TestRequest::get().uri("/login").to_request()).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let cookie = common::session_cookie(&resp).expect("login page sets a session");
        let token = common::csrf_token(&test::read_body(resp).await);

        let body = serde_urlencoded::to_string([
            ("email", $email),
            ("password", $password),
            ("csrf_token", token.as_str()),
        ])
        .unwrap();
        let req = test::TestRequest::post()
            .uri("/login")
            .cookie(cookie)
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get("location").unwrap(), "/dashboard");
        common::session_cookie(&resp).expect("login refreshes the session")
    }};
}

/// GET `$path` as the session in `$cookie` and take its CSRF token. The
/// cookie is replaced when the page issued a new one. Evaluates to the token.
macro_rules! page_token {
    ($app:expr, $cookie:expr, $path:expr) => {{
        use actix_web::test;
        let req = test::TestRequest::get().uri($path).cookie($cookie.clone()).to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK, "{}", $path);
        if let Some(fresh) = common::session_cookie(&resp) {
            $cookie = fresh;
        }
        common::csrf_token(&test::read_body(resp).await)
    }};
}

/// POST a urlencoded form as the session in `$cookie`. Evaluates to the response.
macro_rules! post_form {
    ($app:expr, $cookie:expr, $path:expr, $fields:expr) => {{
        use actix_web::test;
        let req = test::TestRequest::post()
            .uri($path)
            .cookie($cookie.clone())
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload(serde_urlencoded::to_string($fields).unwrap())
            .to_request();
        test::call_service(&$app, req).await
    }};
}
