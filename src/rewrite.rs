use axum::http::{Uri, uri::PathAndQuery};

use crate::tenant::TenantSlug;

/// Internal API routes. Never rewritten, whatever the host.
pub const API_PREFIX: &str = "/api";
/// Static assets. Never rewritten, whatever the host.
pub const STATIC_PREFIX: &str = "/static";
/// Internal mount point of the public tenant boards.
pub const BOARD_PREFIX: &str = "/board";

/// has_path_prefix
///
/// Segment-aware prefix test: `/api` and `/api/boards` match `/api`, `/apiary` does not.
pub fn has_path_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// is_passthrough
///
/// Infrastructure routes that are served as-is even on a tenant host.
pub fn is_passthrough(path: &str) -> bool {
    has_path_prefix(path, API_PREFIX) || has_path_prefix(path, STATIC_PREFIX)
}

/// rewrite_path
///
/// Maps a tenant request path onto the internal board route: `/board/{slug}{path}`.
/// Returns `None` for passthrough paths, which keep their original location.
///
/// Applying this twice double-prefixes the path; callers rewrite once per request.
pub fn rewrite_path(slug: &TenantSlug, path: &str) -> Option<String> {
    if is_passthrough(path) {
        return None;
    }
    Some(format!("{BOARD_PREFIX}/{slug}{path}"))
}

/// with_path
///
/// Rebuilds `uri` with a new path, keeping its query string. The client never sees the result.
pub fn with_path(uri: &Uri, path: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}
