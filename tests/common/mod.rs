#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::Utc;
use freejobboard::{
    AppConfig, AppState, MockIdentityProvider,
    models::{Board, BoardSettings, BoardStats, Job, JobStatus, NewBoard, NewJob, User},
    repository::{RepoResult, Repository, RepositoryError},
};
use serde::de::DeserializeOwned;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use tower::ServiceExt;
use uuid::Uuid;

// --- In-Memory Repository ---

/// Behaves like the Postgres repository, including both unique indexes on `boards`.
#[derive(Default)]
pub struct InMemoryRepo {
    users: Mutex<HashMap<Uuid, User>>,
    boards: Mutex<Vec<Board>>,
    jobs: Mutex<Vec<Job>>,
    /// Simulates an unreachable data store for principal lookups.
    pub fail_user_lookup: AtomicBool,
    /// Simulates an unreachable data store for every board read.
    pub fail_board_reads: AtomicBool,
    insert_board_calls: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap()
}

fn outage() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

impl InMemoryRepo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_user_lookup(&self, fail: bool) {
        self.fail_user_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_board_reads(&self, fail: bool) {
        self.fail_board_reads.store(fail, Ordering::SeqCst);
    }

    pub fn seed_user(&self, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        lock(&self.users).insert(user.id, user.clone());
        user
    }

    pub fn seed_board(&self, slug: &str, owner_id: Uuid, approved: bool) -> Board {
        let board = Board {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: slug.to_string(),
            owner_id,
            approved,
            primary_color: "#6366f1".to_string(),
            created_at: Utc::now(),
            ..Board::default()
        };
        lock(&self.boards).push(board.clone());
        board
    }

    pub fn seed_job(&self, board_id: Uuid, slug: &str, status: JobStatus) -> Job {
        let job = Job {
            id: Uuid::new_v4(),
            board_id,
            title: slug.to_string(),
            slug: slug.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary_currency: "USD".to_string(),
            description: "Build things".to_string(),
            apply_url: Some("https://acme.test/apply".to_string()),
            status,
            created_at: Utc::now(),
            ..Job::default()
        };
        lock(&self.jobs).push(job.clone());
        job
    }

    pub fn job_views(&self, job_id: Uuid) -> i64 {
        lock(&self.jobs)
            .iter()
            .find(|j| j.id == job_id)
            .map(|j| j.views)
            .unwrap_or(-1)
    }

    pub fn insert_board_calls(&self) -> usize {
        self.insert_board_calls.load(Ordering::SeqCst)
    }

    pub fn board_count(&self) -> usize {
        lock(&self.boards).len()
    }

    fn check_board_reads(&self) -> RepoResult<()> {
        if self.fail_board_reads.load(Ordering::SeqCst) {
            return Err(outage());
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        if self.fail_user_lookup.load(Ordering::SeqCst) {
            return Err(outage());
        }
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn create_user(&self, user: User) -> RepoResult<User> {
        Ok(lock(&self.users).entry(user.id).or_insert(user).clone())
    }

    async fn find_board_by_slug(&self, slug: &str) -> RepoResult<Option<Board>> {
        self.check_board_reads()?;
        Ok(lock(&self.boards).iter().find(|b| b.slug == slug).cloned())
    }

    async fn find_approved_board_by_slug(&self, slug: &str) -> RepoResult<Option<Board>> {
        self.check_board_reads()?;
        Ok(lock(&self.boards)
            .iter()
            .find(|b| b.slug == slug && b.approved)
            .cloned())
    }

    async fn find_board_by_owner(&self, owner_id: Uuid) -> RepoResult<Option<Board>> {
        self.check_board_reads()?;
        Ok(lock(&self.boards)
            .iter()
            .find(|b| b.owner_id == owner_id)
            .cloned())
    }

    async fn insert_board(&self, new: NewBoard) -> RepoResult<Board> {
        self.insert_board_calls.fetch_add(1, Ordering::SeqCst);
        let mut boards = lock(&self.boards);
        if boards.iter().any(|b| b.slug == new.slug) {
            return Err(RepositoryError::SlugTaken);
        }
        if boards.iter().any(|b| b.owner_id == new.owner_id) {
            return Err(RepositoryError::OwnerAlreadyHasBoard);
        }
        let board = Board {
            id: Uuid::new_v4(),
            slug: new.slug,
            name: new.name,
            owner_id: new.owner_id,
            approved: new.approved,
            primary_color: "#6366f1".to_string(),
            created_at: Utc::now(),
            ..Board::default()
        };
        boards.push(board.clone());
        Ok(board)
    }

    async fn update_board_settings(
        &self,
        owner_id: Uuid,
        settings: BoardSettings,
    ) -> RepoResult<Option<Board>> {
        let mut boards = lock(&self.boards);
        let Some(board) = boards.iter_mut().find(|b| b.owner_id == owner_id) else {
            return Ok(None);
        };
        board.name = settings.name;
        board.tagline = settings.tagline;
        board.category = settings.category;
        board.primary_color = settings.primary_color;
        board.custom_domain = settings.custom_domain;
        Ok(Some(board.clone()))
    }

    async fn board_stats(&self, board_id: Uuid) -> RepoResult<BoardStats> {
        let jobs = lock(&self.jobs);
        let on_board = jobs.iter().filter(|j| j.board_id == board_id);
        Ok(BoardStats {
            total_jobs: on_board.clone().count() as i64,
            active_jobs: on_board.filter(|j| j.status == JobStatus::Active).count() as i64,
        })
    }

    async fn list_active_jobs(&self, board_id: Uuid) -> RepoResult<Vec<Job>> {
        let mut jobs: Vec<Job> = lock(&self.jobs)
            .iter()
            .filter(|j| j.board_id == board_id && j.status == JobStatus::Active)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(jobs)
    }

    async fn list_board_jobs(&self, board_id: Uuid) -> RepoResult<Vec<Job>> {
        let mut jobs: Vec<Job> = lock(&self.jobs)
            .iter()
            .filter(|j| j.board_id == board_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn recent_board_jobs(&self, board_id: Uuid, limit: i64) -> RepoResult<Vec<Job>> {
        let mut jobs = self.list_board_jobs(board_id).await?;
        jobs.truncate(limit as usize);
        Ok(jobs)
    }

    async fn find_active_job(&self, board_id: Uuid, job_slug: &str) -> RepoResult<Option<Job>> {
        Ok(lock(&self.jobs)
            .iter()
            .find(|j| j.board_id == board_id && j.slug == job_slug && j.status == JobStatus::Active)
            .cloned())
    }

    async fn insert_job(&self, new: NewJob) -> RepoResult<Job> {
        let mut jobs = lock(&self.jobs);
        if jobs
            .iter()
            .any(|j| j.board_id == new.board_id && j.slug == new.slug)
        {
            return Err(RepositoryError::Database(sqlx::Error::Protocol(
                "duplicate job slug".to_string(),
            )));
        }
        let job = Job {
            id: Uuid::new_v4(),
            board_id: new.board_id,
            title: new.title,
            slug: new.slug,
            company: new.company,
            location: new.location,
            remote: new.remote,
            job_type: new.job_type,
            salary_min: new.salary_min,
            salary_max: new.salary_max,
            salary_currency: "USD".to_string(),
            description: new.description,
            requirements: new.requirements,
            apply_url: new.apply_url,
            apply_email: new.apply_email,
            status: JobStatus::Active,
            created_at: Utc::now(),
            ..Job::default()
        };
        jobs.push(job.clone());
        Ok(job)
    }

    async fn increment_job_views(&self, job_id: Uuid) -> RepoResult<()> {
        if let Some(job) = lock(&self.jobs).iter_mut().find(|j| j.id == job_id) {
            job.views += 1;
        }
        Ok(())
    }
}

// --- State & Request Helpers ---

pub const ROOT: &str = "freejobboard.ai";

pub fn test_state(repo: Arc<InMemoryRepo>) -> AppState {
    test_state_with(repo, AppConfig::default())
}

pub fn test_state_with(repo: Arc<InMemoryRepo>, config: AppConfig) -> AppState {
    AppState::new(repo, Arc::new(MockIdentityProvider::new()), config)
}

/// `Cookie` header value carrying a freshly issued session for `user_id`.
pub fn session_cookie(state: &AppState, user_id: Uuid) -> String {
    let token = state.sessions.issue(user_id).unwrap();
    format!("fjb_session={token}")
}

pub fn get(host: &str, path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_cookie(host: &str, path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::HOST, host)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(
    host: &str,
    path: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::HOST, host)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}
