use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    AppState,
    auth::SESSION_COOKIE,
    guard::{self, RouteDecision},
    rewrite::with_path,
    tenant::resolve_tenant,
};

/// request_host
///
/// The `Host` header, or the URI authority for HTTP/2 requests that carry no such header.
fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.as_str().to_string()))
}

/// route_request
///
/// The per-request routing pipeline, run before route matching:
/// resolve tenant → validate session → decide → rewrite.
///
/// The resolved principal (if any) is inserted into the request extensions, which is the only way
/// handlers learn who is calling. A re-issued session credential is appended to whatever response
/// comes back, unless the handler set or cleared the session cookie itself. Routing never fails
/// with a raw error: an unusable rewrite target becomes a 404.
pub async fn route_request(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request_host(&request);
    let tenant = resolve_tenant(host.as_deref(), &state.config.root_domain);

    let session = state.sessions.validate(&jar, state.repo.as_ref()).await;

    let decision = guard::decide(
        tenant.as_ref(),
        request.uri().path(),
        session.principal.as_ref(),
    );
    tracing::debug!(
        host = host.as_deref().unwrap_or(""),
        tenant = tenant.as_ref().map(|t| t.as_str()).unwrap_or(""),
        authenticated = session.principal.is_some(),
        ?decision,
        "routing decision"
    );

    if let Some(principal) = session.principal {
        request.extensions_mut().insert(principal);
    }

    let response = match decision {
        RouteDecision::Redirect(target) => Redirect::temporary(target).into_response(),
        RouteDecision::Rewrite(internal_path) => match with_path(request.uri(), &internal_path) {
            Ok(uri) => {
                *request.uri_mut() = uri;
                next.run(request).await
            }
            Err(e) => {
                tracing::debug!(error = %e, path = %internal_path, "tenant rewrite produced an invalid URI");
                StatusCode::NOT_FOUND.into_response()
            }
        },
        RouteDecision::Allow => next.run(request).await,
    };

    match session.refreshed {
        Some(cookie) if !sets_session_cookie(&response) => {
            (CookieJar::new().add(cookie), response).into_response()
        }
        _ => response,
    }
}

/// sets_session_cookie
///
/// True when the handler already wrote the session cookie (login, sign-up, logout). Its value wins
/// over a refresh of the credential the request came in with.
fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{SESSION_COOKIE}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.trim_start().starts_with(&prefix))
}
