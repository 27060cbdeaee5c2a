use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Routing pipeline: tenant resolution, session validation, access guard, rewrite.
pub mod tenant;
pub mod auth;
pub mod guard;
pub mod rewrite;
pub mod pipeline;

// Application services and components.
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repository;
pub mod slug;

pub mod routes;
use routes::{dashboard, public};

// --- Public Re-exports ---

pub use auth::SessionValidator;
pub use config::AppConfig;
pub use identity::{IdentityState, MockIdentityProvider, SupabaseIdentityClient};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every JSON endpoint, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::signup, handlers::login, handlers::logout, handlers::login_page,
        handlers::register_page, handlers::create_board,
        handlers::board_page, handlers::job_page, handlers::dashboard_overview,
        handlers::list_jobs, handlers::post_job, handlers::get_settings, handlers::update_settings
    ),
    components(
        schemas(
            models::Board, models::BoardTheme, models::Job, models::JobType, models::JobStatus,
            models::CreateBoardRequest, models::CredentialsRequest, models::PostJobRequest,
            models::UpdateBoardSettingsRequest, models::AuthPage, models::OkResponse, models::SessionResponse,
            models::BoardPage, models::JobPage, models::BoardStats, models::DashboardOverview,
        )
    ),
    tags(
        (name = "freejobboard", description = "Multi-tenant job board API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Single, immutable container of the services shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Data store access (boards, jobs, principals).
    pub repo: RepositoryState,
    /// External identity provider for sign-up and sign-in.
    pub identity: IdentityState,
    /// Issues and validates session credentials.
    pub sessions: SessionValidator,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state, deriving the session validator from `config`.
    pub fn new(repo: RepositoryState, identity: IdentityState, config: AppConfig) -> Self {
        Self {
            repo,
            identity,
            sessions: SessionValidator::from_config(&config),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for SessionValidator {
    fn from_ref(app_state: &AppState) -> SessionValidator {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application's routing structure.
///
/// The routing pipeline must see the request before route matching, because a tenant request is
/// rewritten onto a different path. The application router is therefore mounted as the fallback
/// service of an outer router, and the pipeline is layered on that outer router.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Application Router (matched against the possibly rewritten path)
    let app_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(dashboard::dashboard_routes())
        // Assets are served as-is on every host; the pipeline never rewrites this prefix.
        .nest_service(
            rewrite::STATIC_PREFIX,
            ServeDir::new(&state.config.static_dir),
        )
        .with_state(state.clone());

    // 3. Routing Pipeline: resolve tenant → validate session → guard → rewrite.
    let routed = Router::new()
        .fallback_service(app_router)
        .layer(middleware::from_fn_with_state(state, pipeline::route_request));

    // 4. Observability and Correlation Layers (outermost, so rewritten requests keep one span)
    routed
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer`: method, original URI, host and the generated request ID, so every log
/// line of a request (including tenant rewrites) is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");
    let host = request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        host = %host,
        req_id = %request_id,
    )
}
