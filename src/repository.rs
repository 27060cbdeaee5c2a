use crate::models::{Board, BoardSettings, BoardStats, Job, NewBoard, NewJob, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// RepositoryError
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// `boards.slug` unique index violated.
    #[error("board slug is already taken")]
    SlugTaken,
    /// `boards.owner_id` unique index violated.
    #[error("owner already has a board")]
    OwnerAlreadyHasBoard,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Abstract contract for all persistence operations. Handlers and the session validator only see
/// this trait, so tests swap in an in-memory implementation.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Principals ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    // Idempotent: an existing row with the same id is returned unchanged.
    async fn create_user(&self, user: User) -> RepoResult<User>;

    // --- Boards ---
    // Any approval state. Used right after creation and for existence checks.
    async fn find_board_by_slug(&self, slug: &str) -> RepoResult<Option<Board>>;
    // Public read path: unapproved boards are indistinguishable from missing ones.
    async fn find_approved_board_by_slug(&self, slug: &str) -> RepoResult<Option<Board>>;
    async fn find_board_by_owner(&self, owner_id: Uuid) -> RepoResult<Option<Board>>;
    // Fails with SlugTaken / OwnerAlreadyHasBoard on the respective unique index.
    async fn insert_board(&self, board: NewBoard) -> RepoResult<Board>;
    // Owner-Only: updates nothing (None) unless `owner_id` owns the board.
    async fn update_board_settings(
        &self,
        owner_id: Uuid,
        settings: BoardSettings,
    ) -> RepoResult<Option<Board>>;
    async fn board_stats(&self, board_id: Uuid) -> RepoResult<BoardStats>;

    // --- Jobs ---
    // Active jobs, featured first, then newest first.
    async fn list_active_jobs(&self, board_id: Uuid) -> RepoResult<Vec<Job>>;
    // Every status, newest first.
    async fn list_board_jobs(&self, board_id: Uuid) -> RepoResult<Vec<Job>>;
    async fn recent_board_jobs(&self, board_id: Uuid, limit: i64) -> RepoResult<Vec<Job>>;
    async fn find_active_job(&self, board_id: Uuid, job_slug: &str) -> RepoResult<Option<Job>>;
    async fn insert_job(&self, job: NewJob) -> RepoResult<Job>;
    // Single store-side `views = views + 1`; concurrent views are never lost.
    async fn increment_job_views(&self, job_id: Uuid) -> RepoResult<()>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const BOARD_COLUMNS: &str = "id, slug, name, tagline, category, logo_url, owner_id, approved, \
     primary_color, theme, custom_domain, created_at";

const JOB_COLUMNS: &str = "id, board_id, title, slug, company, company_logo_url, location, remote, \
     job_type, salary_min, salary_max, salary_currency, description, requirements, apply_url, \
     apply_email, status, featured, views, expires_at, created_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// map_board_insert_error
///
/// Translates unique-index violations on `boards` into their domain errors.
fn map_board_insert_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("boards_owner_id_key") => return RepositoryError::OwnerAlreadyHasBoard,
                Some("boards_slug_key") => return RepositoryError::SlugTaken,
                _ => {}
            }
        }
    }
    RepositoryError::Database(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// Mirrors a principal created at the identity provider. Re-running it for the same id
    /// (login after sign-up) leaves the row as is.
    async fn create_user(&self, user: User) -> RepoResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET email = users.email
            RETURNING id, email
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_board_by_slug(&self, slug: &str) -> RepoResult<Option<Board>> {
        let query = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE slug = $1");
        let board = sqlx::query_as::<_, Board>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(board)
    }

    /// find_approved_board_by_slug
    ///
    /// **Security**: the approval filter lives in the query so that an unapproved board yields the
    /// same not-found outcome as a missing one.
    async fn find_approved_board_by_slug(&self, slug: &str) -> RepoResult<Option<Board>> {
        let query = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE slug = $1 AND approved = true");
        let board = sqlx::query_as::<_, Board>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(board)
    }

    async fn find_board_by_owner(&self, owner_id: Uuid) -> RepoResult<Option<Board>> {
        let query = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE owner_id = $1");
        let board = sqlx::query_as::<_, Board>(&query)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(board)
    }

    /// insert_board
    ///
    /// Slug and owner uniqueness are both enforced by unique indexes, so two concurrent
    /// registrations can never both succeed.
    async fn insert_board(&self, board: NewBoard) -> RepoResult<Board> {
        let query = format!(
            "INSERT INTO boards (id, slug, name, owner_id, approved) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {BOARD_COLUMNS}"
        );
        sqlx::query_as::<_, Board>(&query)
            .bind(Uuid::new_v4())
            .bind(&board.slug)
            .bind(&board.name)
            .bind(board.owner_id)
            .bind(board.approved)
            .fetch_one(&self.pool)
            .await
            .map_err(map_board_insert_error)
    }

    async fn update_board_settings(
        &self,
        owner_id: Uuid,
        settings: BoardSettings,
    ) -> RepoResult<Option<Board>> {
        let query = format!(
            "UPDATE boards SET name = $2, tagline = $3, category = $4, primary_color = $5, \
             custom_domain = $6 WHERE owner_id = $1 RETURNING {BOARD_COLUMNS}"
        );
        let board = sqlx::query_as::<_, Board>(&query)
            .bind(owner_id)
            .bind(&settings.name)
            .bind(&settings.tagline)
            .bind(&settings.category)
            .bind(&settings.primary_color)
            .bind(&settings.custom_domain)
            .fetch_optional(&self.pool)
            .await?;
        Ok(board)
    }

    async fn board_stats(&self, board_id: Uuid) -> RepoResult<BoardStats> {
        let (total_jobs, active_jobs) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'active')
            FROM jobs WHERE board_id = $1
            "#,
        )
        .bind(board_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(BoardStats {
            total_jobs,
            active_jobs,
        })
    }

    async fn list_active_jobs(&self, board_id: Uuid) -> RepoResult<Vec<Job>> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE board_id = $1 AND status = 'active' \
             ORDER BY featured DESC, created_at DESC"
        );
        let jobs = sqlx::query_as::<_, Job>(&query)
            .bind(board_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn list_board_jobs(&self, board_id: Uuid) -> RepoResult<Vec<Job>> {
        let query =
            format!("SELECT {JOB_COLUMNS} FROM jobs WHERE board_id = $1 ORDER BY created_at DESC");
        let jobs = sqlx::query_as::<_, Job>(&query)
            .bind(board_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn recent_board_jobs(&self, board_id: Uuid, limit: i64) -> RepoResult<Vec<Job>> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE board_id = $1 ORDER BY created_at DESC LIMIT $2"
        );
        let jobs = sqlx::query_as::<_, Job>(&query)
            .bind(board_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn find_active_job(&self, board_id: Uuid, job_slug: &str) -> RepoResult<Option<Job>> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE board_id = $1 AND slug = $2 AND status = 'active'"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(board_id)
            .bind(job_slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    /// insert_job
    ///
    /// New jobs go live immediately (`status = 'active'`); there is no review step.
    async fn insert_job(&self, job: NewJob) -> RepoResult<Job> {
        let query = format!(
            "INSERT INTO jobs (id, board_id, slug, title, company, location, remote, job_type, \
             salary_min, salary_max, description, requirements, apply_url, apply_email, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 'active') \
             RETURNING {JOB_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Job>(&query)
            .bind(Uuid::new_v4())
            .bind(job.board_id)
            .bind(&job.slug)
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.location)
            .bind(job.remote)
            .bind(job.job_type)
            .bind(job.salary_min)
            .bind(job.salary_max)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(&job.apply_url)
            .bind(&job.apply_email)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    async fn increment_job_views(&self, job_id: Uuid) -> RepoResult<()> {
        sqlx::query("UPDATE jobs SET views = views + 1 WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
