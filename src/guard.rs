use crate::{
    auth::Principal,
    rewrite::{has_path_prefix, rewrite_path},
    tenant::TenantSlug,
};

/// Owner dashboard, only served on the apex host.
pub const DASHBOARD_PREFIX: &str = "/dashboard";
/// Where anonymous dashboard requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// RouteDecision
///
/// Outcome of the access guard for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Serve the request at its original path.
    Allow,
    /// Serve the request from this internal path, invisibly to the client.
    Rewrite(String),
    /// Send the client elsewhere with an HTTP redirect.
    Redirect(&'static str),
}

/// decide
///
/// Pure routing policy, evaluated in this order:
/// 1. a tenant host is rewritten onto its public board (except `/api` and static assets),
///    regardless of the session;
/// 2. a dashboard path without a principal redirects to `/login`;
/// 3. everything else is allowed unchanged. Dashboard pages check board ownership themselves.
///
/// Because step 1 runs first, a dashboard path on a tenant host lands under `/board/{slug}/dashboard`
/// and never reaches the owner dashboard.
pub fn decide(
    tenant: Option<&TenantSlug>,
    path: &str,
    principal: Option<&Principal>,
) -> RouteDecision {
    if let Some(slug) = tenant {
        if let Some(internal) = rewrite_path(slug, path) {
            return RouteDecision::Rewrite(internal);
        }
    }

    if has_path_prefix(path, DASHBOARD_PREFIX) && principal.is_none() {
        return RouteDecision::Redirect(LOGIN_PATH);
    }

    RouteDecision::Allow
}
