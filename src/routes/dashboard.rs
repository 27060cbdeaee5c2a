use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Dashboard Router Module
///
/// Owner pages on the apex host. The routing pipeline already redirects anonymous requests for
/// `/dashboard/*` to `/login`; each handler still takes `AuthUser` and resolves the owner's board
/// itself, so a page is never served for a board the caller does not own.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // Board summary: stats, recent jobs and the public URL.
        .route("/dashboard", get(handlers::dashboard_overview))
        // GET/POST /dashboard/jobs
        // List every job of the board / publish a new one.
        .route(
            "/dashboard/jobs",
            get(handlers::list_jobs).post(handlers::post_job),
        )
        // GET/POST /dashboard/settings
        // Read / update name, tagline, category, colour and custom domain.
        .route(
            "/dashboard/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
}
