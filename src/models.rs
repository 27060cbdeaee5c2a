use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Local mirror of a principal created at the identity provider (`public.users`).
/// The session validator looks the principal up here on every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    // Primary Key, equal to the identity provider's user id.
    pub id: Uuid,
    pub email: String,
}

/// BoardTheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default)]
#[sqlx(type_name = "board_theme", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum BoardTheme {
    #[default]
    Light,
    Dark,
    Auto,
}

/// Board
///
/// The tenant record. `slug` is globally unique, immutable after creation and the only key used for
/// subdomain resolution. Each owner holds at most one board (`UNIQUE(owner_id)`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Board {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub tagline: Option<String>,
    pub category: Option<String>,
    pub logo_url: Option<String>,
    // FK to public.users.id
    pub owner_id: Uuid,
    // Unapproved boards are served as not-found to the public.
    pub approved: bool,
    pub primary_color: String,
    pub theme: BoardTheme,
    pub custom_domain: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// JobType
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default)]
#[sqlx(type_name = "job_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

/// JobStatus
///
/// Jobs are created `active`; only active jobs are visible on the public board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum JobStatus {
    Draft,
    #[default]
    Active,
    Filled,
    Expired,
}

/// Job
///
/// A listing exclusively owned by one board. `slug` is unique within the board.
/// `views` is a display counter incremented store-side on every detail view.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Job {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub slug: String,
    pub company: String,
    pub company_logo_url: Option<String>,
    pub location: String,
    pub remote: bool,
    pub job_type: JobType,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub salary_currency: String,
    pub description: String,
    pub requirements: Option<String>,
    pub apply_url: Option<String>,
    pub apply_email: Option<String>,
    pub status: JobStatus,
    pub featured: bool,
    pub views: i64,
    #[ts(type = "string | null")]
    pub expires_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// apply_href
    ///
    /// Where the "Apply" button points: the apply URL, else a `mailto:` link, else nothing.
    pub fn apply_href(&self) -> Option<String> {
        self.apply_url
            .clone()
            .or_else(|| self.apply_email.as_ref().map(|email| format!("mailto:{email}")))
    }
}

// --- Repository Inputs ---

/// NewBoard
///
/// Validated input for `Repository::insert_board`.
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub slug: String,
    pub name: String,
    pub owner_id: Uuid,
    pub approved: bool,
}

/// NewJob
///
/// Validated input for `Repository::insert_job`. The status is always `active` on insert.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub board_id: Uuid,
    pub slug: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub remote: bool,
    pub job_type: JobType,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub description: String,
    pub requirements: Option<String>,
    pub apply_url: Option<String>,
    pub apply_email: Option<String>,
}

/// BoardSettings
///
/// Validated owner-editable board fields for `Repository::update_board_settings`.
#[derive(Debug, Clone, Default)]
pub struct BoardSettings {
    pub name: String,
    pub tagline: Option<String>,
    pub category: Option<String>,
    pub primary_color: String,
    pub custom_domain: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateBoardRequest
///
/// Body of `POST /api/boards/create`. Fields are optional so that a missing field is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateBoardRequest {
    pub user_id: Option<Uuid>,
    pub slug: Option<String>,
    pub name: Option<String>,
}

/// CredentialsRequest
///
/// Body of the sign-up and login endpoints. The password is forwarded to the identity provider
/// and never stored or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// PostJobRequest
///
/// Body of `POST /dashboard/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostJobRequest {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub job_type: JobType,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub description: String,
    pub requirements: Option<String>,
    pub apply_url: Option<String>,
    pub apply_email: Option<String>,
}

/// UpdateBoardSettingsRequest
///
/// Body of `POST /dashboard/settings`. Blank optional fields clear the stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateBoardSettingsRequest {
    pub name: String,
    pub tagline: Option<String>,
    pub category: Option<String>,
    pub primary_color: String,
    pub custom_domain: Option<String>,
}

// --- Responses (Output Schemas) ---

/// AuthPage
///
/// Served at `/login` and `/register`: where the form posts, the optional second step, where to
/// go afterwards and the link to the other flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthPage {
    pub submit: String,
    pub then: Option<String>,
    pub next: String,
    pub alternate: String,
}

/// OkResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct OkResponse {
    pub ok: bool,
}

/// SessionResponse
///
/// Returned by sign-up and login alongside the `Set-Cookie` header.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionResponse {
    pub user_id: Uuid,
}

/// BoardPage
///
/// Public landing page of a tenant board.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BoardPage {
    pub board: Board,
    pub jobs: Vec<Job>,
}

/// JobPage
///
/// Public detail page of a single job.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobPage {
    pub board: Board,
    pub job: Job,
    pub apply_href: Option<String>,
}

/// BoardStats
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BoardStats {
    pub total_jobs: i64,
    pub active_jobs: i64,
}

/// DashboardOverview
///
/// Owner dashboard landing data (GET /dashboard).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardOverview {
    pub board: Board,
    // Public address of the board, e.g. https://acme.freejobboard.ai
    pub board_url: String,
    pub stats: BoardStats,
    pub recent_jobs: Vec<Job>,
}
