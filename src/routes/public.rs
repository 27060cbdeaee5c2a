use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The public board routes are what tenant hosts are
/// rewritten onto: `acme.{root}/jobs/x` is served by `/board/acme/jobs/x`.
///
/// Security Mandate:
/// Board lookups here go through `find_approved_board_by_slug`, so unapproved boards stay hidden.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/signup, /api/auth/login, /api/auth/logout
        // Session lifecycle. The identity provider owns passwords; the session cookie is ours.
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        // GET /login, /register
        // Redirect targets of the dashboard guard and of owners without a board.
        .route("/login", get(handlers::login_page))
        .route("/register", get(handlers::register_page))
        // POST /api/boards/create
        // Registration step two. Requires the session from sign-up (checked by the AuthUser extractor).
        .route("/api/boards/create", post(handlers::create_board))
        // GET /board/{slug}
        // A tenant root request arrives here as `/board/{slug}/` after the rewrite.
        .route("/board/{slug}", get(handlers::board_page))
        .route("/board/{slug}/", get(handlers::board_page))
        // GET /board/{slug}/jobs/{job_slug}
        // Job detail; bumps the view counter.
        .route("/board/{slug}/jobs/{job_slug}", get(handlers::job_page))
}
