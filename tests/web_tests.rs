mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{
    SIGN_IN_URL, TestResponse, bearer, get, json_request, onboard, sample_profile, send,
    spawn_app,
};

fn session_cookie(response: &TestResponse) -> String {
    let header = response
        .headers
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("missing set-cookie header");
    header.split(';').next().unwrap().to_string()
}

fn csrf_token(html: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html.find(marker).expect("missing csrf field") + marker.len();
    let end = html[start..].find('"').unwrap();
    html[start..start + end].to_string()
}

fn form_post(user: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/onboarding")
        .header("authorization", bearer(user))
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn with_host(uri: &str, host: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", host)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_anonymous_visitors_are_sent_to_sign_in() {
    let app = spawn_app().await;

    for path in ["/", "/dashboard", "/onboarding"] {
        let response = send(&app, get(path, None)).await;
        assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(response.location(), Some(SIGN_IN_URL), "{path}");
    }
}

#[tokio::test]
async fn test_signed_in_users_without_practice_are_sent_to_onboarding() {
    let app = spawn_app().await;

    for path in ["/", "/dashboard"] {
        let response = send(&app, get(path, Some("user_1"))).await;
        assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(response.location(), Some("/onboarding"), "{path}");
    }
}

#[tokio::test]
async fn test_onboarded_users_reach_dashboard() {
    let app = spawn_app().await;
    onboard(&app, "user_1", "dr-johnson").await;

    let home = send(&app, get("/", Some("user_1"))).await;
    assert_eq!(home.location(), Some("/dashboard"));

    let onboarding = send(&app, get("/onboarding", Some("user_1"))).await;
    assert_eq!(onboarding.location(), Some("/dashboard"));

    let dashboard = send(&app, get("/dashboard", Some("user_1"))).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("Johnson Cardiology"));
    assert!(dashboard.body.contains("/org/dr-johnson"));
    assert!(dashboard.body.contains("http://dr-johnson.medfolio.test/"));
}

#[tokio::test]
async fn test_onboarding_form_is_prefilled() {
    let app = spawn_app().await;

    let response = send(&app, get("/onboarding", Some("user_1"))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("value=\"Sarah Johnson\""));
    assert!(!csrf_token(&response.body).is_empty());
    assert!(session_cookie(&response).starts_with("medfolio_form="));
}

#[tokio::test]
async fn test_onboarding_form_submission() {
    let app = spawn_app().await;

    let page = send(&app, get("/onboarding", Some("user_1"))).await;
    let cookie = session_cookie(&page);
    let token = csrf_token(&page.body);

    let body = format!(
        "csrf_token={token}&full_name=Sarah+Johnson&username=dr-johnson&practice_name="
    );
    let response = send(&app, form_post("user_1", Some(&cookie), &body)).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/dashboard"));

    let placeholder = send(&app, get("/org/dr-johnson", None)).await;
    assert_eq!(placeholder.status, StatusCode::OK);
    assert!(placeholder.body.contains("Sarah Johnson"));
}

#[tokio::test]
async fn test_onboarding_form_requires_csrf_token() {
    let app = spawn_app().await;

    let missing = send(
        &app,
        form_post("user_1", None, "full_name=Sarah+Johnson&username=dr-johnson"),
    )
    .await;
    assert_eq!(missing.status, StatusCode::FORBIDDEN);

    let page = send(&app, get("/onboarding", Some("user_1"))).await;
    let cookie = session_cookie(&page);
    let forged = send(
        &app,
        form_post(
            "user_1",
            Some(&cookie),
            "csrf_token=forged&full_name=Sarah+Johnson&username=dr-johnson",
        ),
    )
    .await;
    assert_eq!(forged.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_onboarding_form_shows_errors() {
    let app = spawn_app().await;
    onboard(&app, "user_2", "dr-johnson").await;

    let page = send(&app, get("/onboarding", Some("user_1"))).await;
    let cookie = session_cookie(&page);

    let invalid = send(
        &app,
        form_post(
            "user_1",
            Some(&cookie),
            &format!(
                "csrf_token={}&full_name=Sarah+Johnson&username=ab",
                csrf_token(&page.body)
            ),
        ),
    )
    .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(invalid.body.contains("Username must be at least 3 characters"));

    let taken = send(
        &app,
        form_post(
            "user_1",
            Some(&cookie),
            &format!(
                "csrf_token={}&full_name=Sarah+Johnson&username=dr-johnson",
                csrf_token(&invalid.body)
            ),
        ),
    )
    .await;
    assert_eq!(taken.status, StatusCode::CONFLICT);
    assert!(taken.body.contains("Organization with this slug already exists"));
}

#[tokio::test]
async fn test_practice_page_renders_profile() {
    let app = spawn_app().await;
    onboard(&app, "user_1", "dr-johnson").await;
    send(
        &app,
        json_request(
            "PUT",
            "/api/organizations/dr-johnson/profile",
            Some("user_1"),
            &sample_profile(),
        ),
    )
    .await;

    for path in ["/org/dr-johnson", "/s/dr-johnson"] {
        let response = send(&app, get(path, None)).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert!(response.body.contains("Preventive Cardiology"), "{path}");
        assert!(response.body.contains("Harvard Medical School"), "{path}");
        assert!(response.body.contains("Top Doctor Award"), "{path}");
        assert!(response.body.contains("Licensed Medical Professional"), "{path}");
    }
}

#[tokio::test]
async fn test_practice_page_by_subdomain() {
    let app = spawn_app().await;
    onboard(&app, "user_1", "dr-johnson").await;

    let response = send(&app, with_host("/", "dr-johnson.medfolio.test:6789")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Johnson Cardiology"));

    let unknown = send(&app, with_host("/", "dr-nobody.medfolio.test")).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let apex = send(&app, with_host("/", "medfolio.test")).await;
    assert_eq!(apex.status, StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_unknown_pages_render_not_found() {
    let app = spawn_app().await;

    let practice = send(&app, get("/org/dr-nobody", None)).await;
    assert_eq!(practice.status, StatusCode::NOT_FOUND);
    assert!(practice.body.contains("<html"));

    let page = send(&app, get("/no/such/page", None)).await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let app = spawn_app().await;

    let response = send(&app, get("/static/style.css", None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/css"))
    );

    let missing = send(&app, get("/static/missing.js", None)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pages_carry_security_headers() {
    let app = spawn_app().await;

    let response = send(&app, get("/org/dr-nobody", None)).await;

    assert!(response.headers.contains_key("content-security-policy"));
}
