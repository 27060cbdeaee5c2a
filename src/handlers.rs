use crate::{
    AppState,
    auth::{AuthUser, Principal},
    error::ApiError,
    guard::{DASHBOARD_PREFIX, LOGIN_PATH},
    models::{
        Board, BoardPage, BoardSettings, CreateBoardRequest, CredentialsRequest,
        AuthPage, DashboardOverview, Job, JobPage, NewBoard, NewJob, OkResponse, PostJobRequest,
        SessionResponse, UpdateBoardSettingsRequest, User,
    },
    slug::{is_canonical_slug, job_slug},
    tenant::is_reserved_subdomain,
};
use axum::{
    Json,
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use uuid::Uuid;

/// Where an owner without a board is sent from the dashboard pages.
const REGISTER_PATH: &str = "/register";
/// Number of jobs shown on the dashboard overview.
const RECENT_JOBS_LIMIT: i64 = 5;
/// Minimum password length accepted at sign-up.
const MIN_PASSWORD_LEN: usize = 8;

// --- Input Normalisation ---

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Blank optional form fields are stored as NULL.
fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

fn normalize_apply_url(raw: Option<&String>) -> Option<String> {
    non_blank(raw).map(|url| {
        if url.starts_with("http") {
            url
        } else {
            format!("https://{url}")
        }
    })
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value.bytes().skip(1).all(|b| b.is_ascii_hexdigit())
}

fn is_domain_name(value: &str) -> bool {
    value.contains('.')
        && !value.starts_with('.')
        && !value.ends_with('.')
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
}

fn validate_credentials(payload: &CredentialsRequest) -> Result<String, ApiError> {
    let email = payload.email.trim().to_ascii_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required.".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(email)
}

/// validate_job
///
/// Turns a dashboard job form into a `NewJob` for `board_id`, rejecting incomplete postings
/// before anything is written.
pub fn validate_job(board_id: Uuid, req: &PostJobRequest) -> Result<NewJob, ApiError> {
    let title = trimmed(&req.title);
    let company = trimmed(&req.company);
    let location = trimmed(&req.location);
    let description = req.description.trim().to_string();

    if title.is_empty() || company.is_empty() || location.is_empty() || description.is_empty() {
        return Err(ApiError::BadRequest(
            "Title, company, location and description are required.".to_string(),
        ));
    }

    let apply_url = normalize_apply_url(req.apply_url.as_ref());
    let apply_email = non_blank(req.apply_email.as_ref());
    if apply_url.is_none() && apply_email.is_none() {
        return Err(ApiError::BadRequest(
            "Provide an apply URL or an apply email.".to_string(),
        ));
    }

    if let (Some(min), Some(max)) = (req.salary_min, req.salary_max) {
        if min > max {
            return Err(ApiError::BadRequest(
                "Minimum salary cannot exceed maximum salary.".to_string(),
            ));
        }
    }
    if req.salary_min.is_some_and(|v| v < 0) || req.salary_max.is_some_and(|v| v < 0) {
        return Err(ApiError::BadRequest("Salary cannot be negative.".to_string()));
    }

    Ok(NewJob {
        board_id,
        slug: job_slug(&title, &company, Utc::now()),
        title,
        company,
        location,
        remote: req.remote,
        job_type: req.job_type,
        salary_min: req.salary_min,
        salary_max: req.salary_max,
        description,
        requirements: non_blank(req.requirements.as_ref()),
        apply_url,
        apply_email,
    })
}

/// validate_settings
pub fn validate_settings(req: &UpdateBoardSettingsRequest) -> Result<BoardSettings, ApiError> {
    let name = trimmed(&req.name);
    if name.is_empty() {
        return Err(ApiError::BadRequest("Board name is required.".to_string()));
    }

    let primary_color = req.primary_color.trim().to_ascii_lowercase();
    if !is_hex_color(&primary_color) {
        return Err(ApiError::BadRequest(
            "Primary color must look like #6366f1.".to_string(),
        ));
    }

    let custom_domain = non_blank(req.custom_domain.as_ref()).map(|d| d.to_ascii_lowercase());
    if let Some(domain) = &custom_domain {
        if !is_domain_name(domain) {
            return Err(ApiError::BadRequest("Custom domain is invalid.".to_string()));
        }
    }

    Ok(BoardSettings {
        name,
        tagline: non_blank(req.tagline.as_ref()),
        category: non_blank(req.category.as_ref()),
        primary_color,
        custom_domain,
    })
}

/// The board owned by `principal`, if any. Every dashboard handler goes through this lookup,
/// so ownership is re-validated per request.
async fn owner_board(state: &AppState, principal: &Principal) -> Result<Option<Board>, ApiError> {
    Ok(state.repo.find_board_by_owner(principal.id).await?)
}

// --- Identity Handlers ---

/// signup
///
/// [Public Route] Creates a principal at the identity provider, mirrors it locally and starts a
/// session. The board is created in a second step through `POST /api/boards/create`, which
/// requires the session issued here.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed up", body = SessionResponse),
        (status = 400, description = "Rejected")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let email = validate_credentials(&payload)?;
    let user_id = state.identity.sign_up(&email, &payload.password).await?;
    let user = state.repo.create_user(User { id: user_id, email }).await?;

    let token = state.sessions.issue(user.id)?;
    tracing::info!(principal = %user.id, "principal signed up");

    Ok((
        jar.add(state.sessions.session_cookie(token)),
        Json(SessionResponse { user_id: user.id }),
    ))
}

/// login
///
/// [Public Route] Verifies credentials at the identity provider and starts a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let email = payload.email.trim().to_ascii_lowercase();
    let user_id = state.identity.sign_in(&email, &payload.password).await?;
    // Principals created before the local mirror existed are backfilled here.
    let user = state.repo.create_user(User { id: user_id, email }).await?;

    let token = state.sessions.issue(user.id)?;
    Ok((
        jar.add(state.sessions.session_cookie(token)),
        Json(SessionResponse { user_id: user.id }),
    ))
}

/// logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Signed out", body = OkResponse))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<OkResponse>) {
    (
        jar.remove(state.sessions.removal_cookie()),
        Json(OkResponse { ok: true }),
    )
}

/// create_board
///
/// [Authenticated Route] Creates the caller's board.
///
/// *Authorization*: `userId` must be the principal of the session issued at sign-up; the body is
/// never trusted on its own. One board per principal.
///
/// *Errors*: missing or malformed fields, a reserved or taken slug, and an existing board are all
/// 400 with a user-facing message; store failures are 500.
#[utoipa::path(
    post,
    path = "/api/boards/create",
    request_body = CreateBoardRequest,
    responses(
        (status = 200, description = "Created", body = OkResponse),
        (status = 400, description = "Invalid or taken"),
        (status = 401, description = "No session"),
        (status = 403, description = "userId does not match the session")
    )
)]
pub async fn create_board(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBoardRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let (Some(user_id), Some(slug), Some(name)) = (
        payload.user_id,
        non_blank(payload.slug.as_ref()),
        non_blank(payload.name.as_ref()),
    ) else {
        return Err(ApiError::BadRequest("Missing fields".to_string()));
    };

    if user_id != principal.id {
        tracing::warn!(principal = %principal.id, claimed = %user_id, "board creation for another principal refused");
        return Err(ApiError::Forbidden(
            "Boards can only be created for the signed-in account.".to_string(),
        ));
    }

    if !is_canonical_slug(&slug) {
        return Err(ApiError::BadRequest("Board name is invalid.".to_string()));
    }
    if is_reserved_subdomain(&slug) {
        return Err(ApiError::BadRequest(
            "That board name is taken. Try another.".to_string(),
        ));
    }

    if owner_board(&state, &principal).await?.is_some() {
        return Err(ApiError::BadRequest(
            "This account already has a board.".to_string(),
        ));
    }
    // Unique index still decides a race between two registrations for the same slug.
    if state.repo.find_board_by_slug(&slug).await?.is_some() {
        return Err(ApiError::BadRequest(
            "That board name is taken. Try another.".to_string(),
        ));
    }

    let board = state
        .repo
        .insert_board(NewBoard {
            slug,
            name,
            owner_id: principal.id,
            approved: state.config.auto_approve_boards,
        })
        .await?;

    tracing::info!(board = %board.slug, owner = %principal.id, "board created");
    Ok(Json(OkResponse { ok: true }))
}

/// login_page
///
/// [Public Route] Target of the dashboard guard's redirect. Describes the sign-in flow for the
/// front end; a caller who is already signed in goes straight to the dashboard.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Sign-in flow", body = AuthPage),
        (status = 307, description = "Already signed in")
    )
)]
pub async fn login_page(principal: Option<Extension<Principal>>) -> Response {
    if principal.is_some() {
        return Redirect::temporary(DASHBOARD_PREFIX).into_response();
    }
    Json(AuthPage {
        submit: "/api/auth/login".to_string(),
        then: None,
        next: DASHBOARD_PREFIX.to_string(),
        alternate: REGISTER_PATH.to_string(),
    })
    .into_response()
}

/// register_page
///
/// [Public Route] Two-step registration: sign up, then create the board with the new session.
/// Also the redirect target for owners who reach the dashboard without a board.
#[utoipa::path(
    get,
    path = "/register",
    responses((status = 200, description = "Registration flow", body = AuthPage))
)]
pub async fn register_page() -> Json<AuthPage> {
    Json(AuthPage {
        submit: "/api/auth/signup".to_string(),
        then: Some("/api/boards/create".to_string()),
        next: DASHBOARD_PREFIX.to_string(),
        alternate: LOGIN_PATH.to_string(),
    })
}

// --- Public Board Handlers ---

/// board_page
///
/// [Public Route] A tenant's landing page: the board and its active jobs.
/// Unknown and unapproved boards are both plain 404s.
#[utoipa::path(
    get,
    path = "/board/{slug}",
    params(("slug" = String, Path, description = "Board slug")),
    responses(
        (status = 200, description = "Board", body = BoardPage),
        (status = 404, description = "Not Found")
    )
)]
pub async fn board_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BoardPage>, ApiError> {
    let board = state
        .repo
        .find_approved_board_by_slug(&slug)
        .await?
        .ok_or(ApiError::NotFound)?;
    let jobs = state.repo.list_active_jobs(board.id).await?;
    Ok(Json(BoardPage { board, jobs }))
}

/// job_page
///
/// [Public Route] Detail page of one active job. Each view bumps the job's counter with a single
/// store-side increment; a failed increment is logged and the page is still served.
#[utoipa::path(
    get,
    path = "/board/{slug}/jobs/{job_slug}",
    params(
        ("slug" = String, Path, description = "Board slug"),
        ("job_slug" = String, Path, description = "Job slug")
    ),
    responses(
        (status = 200, description = "Job", body = JobPage),
        (status = 404, description = "Not Found")
    )
)]
pub async fn job_page(
    State(state): State<AppState>,
    Path((slug, job_slug)): Path<(String, String)>,
) -> Result<Json<JobPage>, ApiError> {
    let board = state
        .repo
        .find_approved_board_by_slug(&slug)
        .await?
        .ok_or(ApiError::NotFound)?;
    let mut job = state
        .repo
        .find_active_job(board.id, &job_slug)
        .await?
        .ok_or(ApiError::NotFound)?;

    match state.repo.increment_job_views(job.id).await {
        Ok(()) => job.views += 1,
        Err(e) => tracing::warn!(job = %job.id, error = %e, "view counter not incremented"),
    }

    let apply_href = job.apply_href();
    Ok(Json(JobPage {
        board,
        job,
        apply_href,
    }))
}

// --- Dashboard Handlers ---

/// dashboard_overview
///
/// [Dashboard Route] Board summary for its owner. Owners without a board are sent to `/register`.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Overview", body = DashboardOverview),
        (status = 307, description = "No board yet")
    )
)]
pub async fn dashboard_overview(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let Some(board) = owner_board(&state, &principal).await? else {
        return Ok(Redirect::temporary(REGISTER_PATH).into_response());
    };

    let stats = state.repo.board_stats(board.id).await?;
    let recent_jobs = state
        .repo
        .recent_board_jobs(board.id, RECENT_JOBS_LIMIT)
        .await?;
    let board_url = format!("https://{}.{}", board.slug, state.config.root_domain);

    Ok(Json(DashboardOverview {
        board,
        board_url,
        stats,
        recent_jobs,
    })
    .into_response())
}

/// list_jobs
///
/// [Dashboard Route] Every job of the owner's board, in any status.
#[utoipa::path(
    get,
    path = "/dashboard/jobs",
    responses((status = 200, description = "My Jobs", body = [Job]))
)]
pub async fn list_jobs(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let Some(board) = owner_board(&state, &principal).await? else {
        return Ok(Redirect::temporary(REGISTER_PATH).into_response());
    };
    let jobs = state.repo.list_board_jobs(board.id).await?;
    Ok(Json(jobs).into_response())
}

/// post_job
///
/// [Dashboard Route] Publishes a job on the owner's board. The target board is always the
/// caller's own; the request cannot name another board.
#[utoipa::path(
    post,
    path = "/dashboard/jobs",
    request_body = PostJobRequest,
    responses(
        (status = 201, description = "Created", body = Job),
        (status = 400, description = "Invalid"),
        (status = 404, description = "No board")
    )
)]
pub async fn post_job(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PostJobRequest>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    let board = owner_board(&state, &principal)
        .await?
        .ok_or(ApiError::NotFound)?;
    let new_job = validate_job(board.id, &payload)?;
    let job = state.repo.insert_job(new_job).await?;
    tracing::info!(board = %board.slug, job = %job.slug, "job posted");
    Ok((StatusCode::CREATED, Json(job)))
}

/// get_settings
#[utoipa::path(
    get,
    path = "/dashboard/settings",
    responses((status = 200, description = "Board settings", body = Board))
)]
pub async fn get_settings(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    match owner_board(&state, &principal).await? {
        Some(board) => Ok(Json(board).into_response()),
        None => Ok(Redirect::temporary(REGISTER_PATH).into_response()),
    }
}

/// update_settings
///
/// [Dashboard Route] Updates the owner's board. The slug is immutable and not part of the form.
#[utoipa::path(
    post,
    path = "/dashboard/settings",
    request_body = UpdateBoardSettingsRequest,
    responses(
        (status = 200, description = "Saved", body = Board),
        (status = 400, description = "Invalid"),
        (status = 404, description = "No board")
    )
)]
pub async fn update_settings(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateBoardSettingsRequest>,
) -> Result<Json<Board>, ApiError> {
    let settings = validate_settings(&payload)?;
    state
        .repo
        .update_board_settings(principal.id, settings)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}
