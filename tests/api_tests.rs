mod common;

use common::InMemoryRepo;
use freejobboard::{
    create_router,
    models::{BoardPage, Job, SessionResponse},
};
use reqwest::{StatusCode, header};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Serves the full router (pipeline, layers and all) on an ephemeral port.
async fn spawn_app() -> TestApp {
    let state = common::test_state(InMemoryRepo::new());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

fn no_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let response = reqwest::get(format!("{}/api-docs/openapi.json", app.address))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc: serde_json::Value = response.json().await.unwrap();
    assert!(doc["paths"].get("/api/boards/create").is_some());
}

#[tokio::test]
async fn test_anonymous_dashboard_is_redirected() {
    let app = spawn_app().await;
    let response = no_redirects()
        .get(format!("{}/dashboard/settings", app.address))
        .header(header::HOST, "freejobboard.ai")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_board_lifecycle() {
    let app = spawn_app().await;
    let client = no_redirects();

    // Sign up
    let response = client
        .post(format!("{}/api/auth/signup", app.address))
        .header(header::HOST, "freejobboard.ai")
        .json(&json!({ "email": "owner@acme.test", "password": "correct horse" }))
        .send()
        .await
        .expect("signup fail");
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let session: SessionResponse = response.json().await.unwrap();

    // Create board
    let response = client
        .post(format!("{}/api/boards/create", app.address))
        .header(header::HOST, "freejobboard.ai")
        .header(header::COOKIE, &cookie)
        .json(&json!({ "userId": session.user_id, "slug": "acme", "name": "Acme" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Post a job from the dashboard
    let response = client
        .post(format!("{}/dashboard/jobs", app.address))
        .header(header::HOST, "freejobboard.ai")
        .header(header::COOKIE, &cookie)
        .json(&json!({
            "title": "Platform Engineer",
            "company": "Acme",
            "location": "Remote",
            "remote": true,
            "description": "Keep the lights on.",
            "applyEmail": "jobs@acme.test"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let job: Job = response.json().await.unwrap();

    // Public board on the tenant subdomain
    let response = client
        .get(format!("{}/", app.address))
        .header(header::HOST, "acme.freejobboard.ai")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: BoardPage = response.json().await.unwrap();
    assert_eq!(page.jobs.len(), 1);
    assert_eq!(page.jobs[0].id, job.id);

    // Job detail on the tenant subdomain
    let response = client
        .get(format!("{}/jobs/{}", app.address, job.slug))
        .header(header::HOST, "acme.freejobboard.ai")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail: serde_json::Value = response.json().await.unwrap();
    assert_eq!(detail["applyHref"], json!("mailto:jobs@acme.test"));
    assert_eq!(detail["job"]["views"], json!(1));
}
