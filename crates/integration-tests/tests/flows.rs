//! Integration tests for the sign-in, registration, onboarding and dashboard
//! flows, plus the onboarding-status API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use campus_core::{Profile, Role};
use campus_integration_tests::{
    TestApp, body_json, body_text, location, onboarded_profile, session_cookie,
};

const EMAIL: &str = "ada@campus.test";
const PASSWORD: &str = "correct-horse";

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let app = TestApp::new();
    let principal = app.identity.add_account(EMAIL, PASSWORD);
    app.profiles
        .put(onboarded_profile(principal, "Ada", "Lovelace", Role::Teacher));

    let form = "email=ada%40campus.test&password=correct-horse&redirect=%2Fdashboard%2Fstudents%2F42";
    let response = app.post_form("/login", form, None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard/students/42"));
    assert!(session_cookie(&response).is_some());
}

#[tokio::test]
async fn test_login_ignores_offsite_redirect() {
    let app = TestApp::new();
    app.identity.add_account(EMAIL, PASSWORD);

    let form = "email=ada%40campus.test&password=correct-horse&redirect=%2F%2Fevil.example";
    let response = app.post_form("/login", form, None).await;

    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new();
    app.identity.add_account(EMAIL, PASSWORD);

    let form = "email=ada%40campus.test&password=nope&redirect=%2Fdashboard%2Fcourses";
    let response = app.post_form("/login", form, None).await;

    assert_eq!(
        location(&response),
        Some("/login?redirect=/dashboard/courses&error=credentials")
    );
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_login_page_shows_error() {
    let app = TestApp::new();

    let response = app.get("/login?error=credentials", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Incorrect email or password."));
}

#[tokio::test]
async fn test_login_creates_profile_row() {
    let app = TestApp::new();
    let principal = app.identity.add_account(EMAIL, PASSWORD);

    app.sign_in(EMAIL, PASSWORD).await;

    let profile = app.profiles.get(principal).unwrap();
    assert!(profile.needs_onboarding());
    assert_eq!(profile.role, Role::Student);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let principal = app.identity.add_account(EMAIL, PASSWORD);
    app.profiles
        .put(onboarded_profile(principal, "Ada", "Lovelace", Role::Student));
    let cookie = app.sign_in(EMAIL, PASSWORD).await;

    let response = app.post_form("/logout", "", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login"));

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login?redirect=/dashboard"));
}

// =============================================================================
// Registration and onboarding
// =============================================================================

#[tokio::test]
async fn test_register_then_onboard() {
    let app = TestApp::new();

    let form = "email=ada%40campus.test&password=correct-horse&password_confirm=correct-horse";
    let response = app.post_form("/register", form, None).await;
    assert_eq!(location(&response), Some("/onboarding"));
    let cookie = session_cookie(&response).unwrap();

    let response = app.get("/onboarding", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post_form(
            "/onboarding",
            "first_name=+Ada+&last_name=Lovelace",
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), Some("/dashboard"));

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Ada Lovelace"));

    let response = app.get("/onboarding", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let app = TestApp::new();

    let form = "email=ada%40campus.test&password=correct-horse&password_confirm=battery-staple";
    let response = app.post_form("/register", form, None).await;

    assert_eq!(location(&response), Some("/register?error=mismatch"));
}

#[tokio::test]
async fn test_register_short_password() {
    let app = TestApp::new();

    let form = "email=ada%40campus.test&password=short&password_confirm=short";
    let response = app.post_form("/register", form, None).await;

    assert_eq!(location(&response), Some("/register?error=weak"));
}

#[tokio::test]
async fn test_register_existing_email_is_rejected() {
    let app = TestApp::new();
    app.identity.add_account(EMAIL, PASSWORD);

    let form = "email=ada%40campus.test&password=correct-horse&password_confirm=correct-horse";
    let response = app.post_form("/register", form, None).await;

    assert_eq!(location(&response), Some("/register?error=rejected"));
}

#[tokio::test]
async fn test_register_with_email_confirmation() {
    let app = TestApp::new();
    app.identity.set_require_confirmation(true);

    let form = "email=ada%40campus.test&password=correct-horse&password_confirm=correct-horse";
    let response = app.post_form("/register", form, None).await;

    assert_eq!(location(&response), Some("/login?notice=confirm"));
}

#[tokio::test]
async fn test_onboarding_rejects_blank_names() {
    let app = TestApp::new();
    let (principal, cookie) = app.signed_in_with(EMAIL, Profile::blank).await;

    let response = app
        .post_form("/onboarding", "first_name=Ada&last_name=+++", Some(&cookie))
        .await;

    assert_eq!(location(&response), Some("/onboarding?error=names"));
    assert!(app.profiles.get(principal).unwrap().needs_onboarding());
}

// =============================================================================
// Dashboard capabilities
// =============================================================================

#[tokio::test]
async fn test_student_cannot_open_user_admin() {
    let app = TestApp::new();
    let (_, cookie) = app
        .signed_in_with(EMAIL, |p| onboarded_profile(p, "Ada", "Lovelace", Role::Student))
        .await;

    let response = app.get("/dashboard/users", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/dashboard/grades", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_teacher_sees_students() {
    let app = TestApp::new();
    let (_, cookie) = app
        .signed_in_with(EMAIL, |p| onboarded_profile(p, "Ada", "Lovelace", Role::Teacher))
        .await;

    let response = app.get("/dashboard/students/42", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_dashboard_section() {
    let app = TestApp::new();
    let (_, cookie) = app
        .signed_in_with(EMAIL, |p| onboarded_profile(p, "Ada", "Lovelace", Role::Admin))
        .await;

    let response = app.get("/dashboard/library", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Onboarding status API
// =============================================================================

#[tokio::test]
async fn test_status_requires_session() {
    let app = TestApp::new();

    let response = app.get("/api/onboarding/status", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_matches_guard() {
    let app = TestApp::new();
    let (_, cookie) = app.signed_in_with(EMAIL, Profile::blank).await;

    let response = app.get("/api/onboarding/status", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "needsOnboarding": true })
    );

    app.post_form(
        "/onboarding",
        "first_name=Ada&last_name=Lovelace",
        Some(&cookie),
    )
    .await;

    let response = app.get("/api/onboarding/status", Some(&cookie)).await;
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "needsOnboarding": false })
    );
}

#[tokio::test]
async fn test_status_profile_failure_is_server_error() {
    let app = TestApp::new();
    let (_, cookie) = app.signed_in_with(EMAIL, Profile::blank).await;
    app.profiles.set_failing(true);

    let response = app.get("/api/onboarding/status", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_status_identity_outage_is_unauthorized() {
    let app = TestApp::new();
    let (_, cookie) = app.signed_in_with(EMAIL, Profile::blank).await;
    app.identity.set_unavailable(true);

    let response = app.get("/api/onboarding/status", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_readiness_reports_store_outage() {
    let app = TestApp::new();

    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    app.profiles.set_failing(true);
    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
