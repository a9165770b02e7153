//! The login flow and access control over HTTP.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use beadle::auth::password::hash_password;
use common::*;

#[actix_rt::test]
async fn protected_pages_redirect_to_login() {
    let pool = seeded_pool().await;
    let app = app!(pool);

    for path in ["/dashboard", "/members", "/reports", "/slips/new"] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(resp.headers().get("location").unwrap(), "/login");
    }
}

#[actix_rt::test]
async fn login_rejects_missing_csrf() {
    let pool = seeded_pool().await;
    let app = app!(pool);

    let body = serde_urlencoded::to_string([
        ("email", ADMIN_EMAIL),
        ("password", ADMIN_PASS),
        ("csrf_token", "forged"),
    ])
    .unwrap();
    let req = test::TestRequest::post()
        .uri("/login")
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn admin_login_reaches_dashboard_and_reports() {
    let pool = seeded_pool().await;
    let app = app!(pool);
    let cookie = log_in!(app, ADMIN_EMAIL, ADMIN_PASS);

    let req = test::TestRequest::get().uri("/dashboard").cookie(cookie.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/reports?date=2025-01-10")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("ATTENDANCE REPORT: 6B"));
}

#[actix_rt::test]
async fn report_api_validates_date() {
    let pool = seeded_pool().await;
    insert_slip_row(&pool, &SlipSeed::new("3rd Form", "2025-01-10")).await;
    let app = app!(pool);
    let cookie = log_in!(app, ADMIN_EMAIL, ADMIN_PASS);

    let req = test::TestRequest::post()
        .uri("/api/reports")
        .cookie(cookie.clone())
        .set_json(serde_json::json!({ "action": "generate", "date": "not-a-date" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("not-a-date"));

    let req = test::TestRequest::post()
        .uri("/api/reports")
        .cookie(cookie)
        .set_json(serde_json::json!({ "action": "generate", "date": "2025-01-10" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["date"], "2025-01-10");
    assert_eq!(body["reports"].as_object().unwrap().len(), 7);
    assert!(!body["reports"]["3rd Form"].as_str().unwrap().contains("NO SUBMISSIONS"));
}

#[actix_rt::test]
async fn member_without_roles_cannot_open_admin_pages() {
    let pool = seeded_pool().await;
    let hash = hash_password("student-pass-1").unwrap();
    sqlx::query("INSERT INTO members (email, full_name, form_class, password_hash) VALUES (?1, 'Stu', '4-1', ?2)")
        .bind("stu@school.local")
        .bind(&hash)
        .execute(&pool)
        .await
        .unwrap();
    let app = app!(pool);
    let cookie = log_in!(app, "stu@school.local", "student-pass-1");

    for path in ["/members", "/reports", "/supervisor", "/slips/new"] {
        let req = test::TestRequest::get().uri(path).cookie(cookie.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{path}");
    }
}

#[actix_rt::test]
async fn wrong_password_shows_error() {
    let pool = seeded_pool().await;
    let app = app!(pool);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    let cookie = session_cookie(&resp).unwrap();
    let token = csrf_token(&test::read_body(resp).await);

    let body = serde_urlencoded::to_string([
        ("email", ADMIN_EMAIL),
        ("password", "nope"),
        ("csrf_token", token.as_str()),
    ])
    .unwrap();
    let req = test::TestRequest::post()
        .uri("/login")
        .cookie(cookie)
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("Invalid email or password"));
}

#[actix_rt::test]
async fn scheduled_api_survives_mistyped_rows() {
    let pool = seeded_pool().await;
    let today = beadle::reports::today(None).format("%Y-%m-%d").to_string();
    insert_slip_row(&pool, &SlipSeed::new("5th Form", &today)).await;
    let bad = insert_slip_row(&pool, &SlipSeed::new("5th Form", &today)).await;
    sqlx::query("UPDATE attendance_slips SET students_present = 'thirty' WHERE id = ?1")
        .bind(bad)
        .execute(&pool)
        .await
        .unwrap();
    let app = app!(pool);
    let cookie = log_in!(app, ADMIN_EMAIL, ADMIN_PASS);

    let req = test::TestRequest::post()
        .uri("/api/reports")
        .cookie(cookie.clone())
        .set_json(serde_json::json!({ "action": "scheduled" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["date"], today.as_str());
    assert!(body["reports"]["5th Form"].as_str().unwrap().contains("ATTENDANCE REPORT: 5th Form"));
    assert!(!body["reports"]["5th Form"].as_str().unwrap().contains("NO SUBMISSIONS"));

    let req = test::TestRequest::get()
        .uri(&format!("/reports?date={today}"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn slip_list_rejects_bad_date() {
    let pool = seeded_pool().await;
    let app = app!(pool);
    let cookie = log_in!(app, ADMIN_EMAIL, ADMIN_PASS);

    let req = test::TestRequest::get().uri("/slips?date=2025-13-40").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
