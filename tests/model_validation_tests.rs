use chrono::Utc;
use freejobboard::models::{
    Board, BoardTheme, CreateBoardRequest, DashboardOverview, Job, JobStatus, JobType,
    PostJobRequest,
};
use serde_json::json;
use uuid::Uuid;

// --- Serialization Contracts ---

#[test]
fn test_job_type_uses_kebab_case() {
    assert_eq!(serde_json::to_value(JobType::FullTime).unwrap(), json!("full-time"));
    assert_eq!(serde_json::to_value(JobType::PartTime).unwrap(), json!("part-time"));
    let parsed: JobType = serde_json::from_value(json!("internship")).unwrap();
    assert_eq!(parsed, JobType::Internship);
    assert!(serde_json::from_value::<JobType>(json!("FullTime")).is_err());
}

#[test]
fn test_job_status_and_theme_are_lowercase() {
    assert_eq!(serde_json::to_value(JobStatus::Filled).unwrap(), json!("filled"));
    assert_eq!(serde_json::to_value(BoardTheme::Dark).unwrap(), json!("dark"));
    assert_eq!(JobStatus::default(), JobStatus::Active);
}

#[test]
fn test_board_serializes_camel_case() {
    let board = Board {
        id: Uuid::new_v4(),
        slug: "acme".to_string(),
        name: "Acme".to_string(),
        owner_id: Uuid::new_v4(),
        primary_color: "#6366f1".to_string(),
        created_at: Utc::now(),
        ..Board::default()
    };
    let value = serde_json::to_value(&board).unwrap();

    assert_eq!(value["ownerId"], json!(board.owner_id));
    assert_eq!(value["primaryColor"], json!("#6366f1"));
    assert!(value.get("owner_id").is_none());
    assert_eq!(value["customDomain"], json!(null));
}

#[test]
fn test_dashboard_overview_serializes_camel_case() {
    let overview = DashboardOverview {
        board_url: "https://acme.freejobboard.ai".to_string(),
        ..DashboardOverview::default()
    };
    let value = serde_json::to_value(&overview).unwrap();
    assert_eq!(value["boardUrl"], json!("https://acme.freejobboard.ai"));
    assert_eq!(value["stats"]["activeJobs"], json!(0));
    assert!(value["recentJobs"].as_array().unwrap().is_empty());
}

// --- Request Payloads ---

#[test]
fn test_create_board_request_tolerates_missing_fields() {
    let parsed: CreateBoardRequest = serde_json::from_value(json!({ "slug": "acme" })).unwrap();
    assert_eq!(parsed.slug.as_deref(), Some("acme"));
    assert!(parsed.user_id.is_none());
    assert!(parsed.name.is_none());
}

#[test]
fn test_post_job_request_defaults() {
    let parsed: PostJobRequest = serde_json::from_value(json!({
        "title": "Engineer",
        "company": "Acme",
        "location": "Remote",
        "description": "Build",
        "applyEmail": "jobs@acme.test"
    }))
    .unwrap();

    assert!(!parsed.remote);
    assert_eq!(parsed.job_type, JobType::FullTime);
    assert_eq!(parsed.apply_email.as_deref(), Some("jobs@acme.test"));
    assert!(parsed.salary_min.is_none());
}

// --- Apply Destination ---

#[test]
fn test_apply_href_prefers_url_then_email() {
    let both = Job {
        apply_url: Some("https://acme.test/apply".to_string()),
        apply_email: Some("jobs@acme.test".to_string()),
        ..Job::default()
    };
    assert_eq!(both.apply_href().as_deref(), Some("https://acme.test/apply"));

    let email_only = Job {
        apply_email: Some("jobs@acme.test".to_string()),
        ..Job::default()
    };
    assert_eq!(email_only.apply_href().as_deref(), Some("mailto:jobs@acme.test"));

    assert_eq!(Job::default().apply_href(), None);
}
